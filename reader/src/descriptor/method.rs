use super::field::FieldType;
use nom::{branch::alt, bytes::complete::tag, combinator::map, IResult};

/// A method descriptor: its parameter types in order, and its return type
/// (`None` for `void`).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    pub return_type: Option<FieldType>,
}

impl MethodDescriptor {
    pub fn parse(input: &str) -> IResult<&str, Self> {
        let (input, parameters) = parse_parameters(input)?;
        let (input, return_type) = parse_return_type(input)?;
        Ok((
            input,
            Self {
                parameters,
                return_type,
            },
        ))
    }

    /// Number of logical parameters (not counting a `long`/`double` twice).
    pub fn args_count(&self) -> usize {
        self.parameters.len()
    }

    /// Number of operand-stack slots the parameters occupy: `long`/`double`
    /// parameters count as 2. Used by `invokevirtual`'s receiver lookup,
    /// which must skip slots, not logical arguments.
    pub fn args_slot_count(&self) -> usize {
        self.parameters.iter().map(FieldType::slot_count).sum()
    }
}

fn parse_parameters(input: &str) -> IResult<&str, Vec<FieldType>> {
    let (input, _) = tag("(")(input)?;
    let (input, parameters) = nom::multi::many0(FieldType::parse_field_type)(input)?;
    let (input, _) = tag(")")(input)?;
    Ok((input, parameters))
}

fn parse_return_type(input: &str) -> IResult<&str, Option<FieldType>> {
    let (input, return_type) = alt((
        map(FieldType::parse_field_type, Some),
        map(tag("V"), |_| None),
    ))(input)?;
    Ok((input, return_type))
}
