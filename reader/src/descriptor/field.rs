use super::class::ClassName;
use nom::{branch::alt, bytes::complete::tag, combinator::map, IResult};

/// A field descriptor: the single [`FieldType`] it denotes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FieldDescriptor(FieldType);

impl FieldDescriptor {
    pub fn parse(input: &str) -> IResult<&str, Self> {
        let (input, field_type) = FieldType::parse_field_type(input)?;
        Ok((input, Self(field_type)))
    }

    pub fn field_type(&self) -> &FieldType {
        &self.0
    }

    /// The class referenced by this descriptor, if any: an object type
    /// names its own class, an array type names its innermost element class.
    pub fn get_referenced_class(&self) -> Option<&ClassName> {
        let mut field_type = &self.0;
        loop {
            match field_type {
                FieldType::BaseType(_) => return None,
                FieldType::ObjectType(object_type) => return Some(&object_type.class_name),
                FieldType::ArrayType(array_type) => {
                    field_type = array_type.item.as_ref();
                }
            }
        }
    }
}

/// One field/parameter/return type, dispatched to primitive, object, or array.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FieldType {
    BaseType(BaseType),
    ObjectType(ObjectType),
    ArrayType(ArrayType),
}

impl FieldType {
    pub fn parse_field_type(input: &str) -> IResult<&str, Self> {
        alt((
            map(BaseType::parse, Self::BaseType),
            map(ObjectType::parse, Self::ObjectType),
            map(ArrayType::parse, Self::ArrayType),
        ))(input)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::BaseType(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::ObjectType(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::ArrayType(_))
    }

    /// Whether this type occupies two operand-stack/local-variable slots
    /// (`long`/`double`), per the JVM's category-2 computational type rule.
    pub fn is_category_2(&self) -> bool {
        matches!(
            self,
            Self::BaseType(BaseType::Long) | Self::BaseType(BaseType::Double)
        )
    }

    /// Number of 32-bit slots this type occupies: 2 for `long`/`double`, 1 otherwise.
    pub fn slot_count(&self) -> usize {
        if self.is_category_2() {
            2
        } else {
            1
        }
    }
}

/// One of the eight JVM primitive types.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub fn parse(input: &str) -> IResult<&str, Self> {
        alt((
            map(tag("B"), |_| Self::Byte),
            map(tag("C"), |_| Self::Char),
            map(tag("D"), |_| Self::Double),
            map(tag("F"), |_| Self::Float),
            map(tag("I"), |_| Self::Int),
            map(tag("J"), |_| Self::Long),
            map(tag("S"), |_| Self::Short),
            map(tag("Z"), |_| Self::Boolean),
        ))(input)
    }
}

/// A reference type named by its class (`Lsome/Class;`).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ObjectType {
    pub class_name: ClassName,
}

impl ObjectType {
    pub fn new(class_name: ClassName) -> Self {
        Self { class_name }
    }

    pub fn parse(input: &str) -> IResult<&str, Self> {
        let (input, _) = tag("L")(input)?;
        let (input, class_name) = ClassName::parse(input)?;
        let (input, _) = tag(";")(input)?;
        Ok((input, Self { class_name }))
    }
}

/// An array type (`[<component>`), possibly multi-dimensional.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ArrayType {
    pub item: Box<FieldType>,
}

impl ArrayType {
    pub fn new(item: FieldType) -> Self {
        Self {
            item: Box::new(item),
        }
    }

    pub fn parse(input: &str) -> IResult<&str, Self> {
        let (input, _) = tag("[")(input)?;
        let (input, item) = FieldType::parse_field_type(input)?;
        Ok((
            input,
            Self {
                item: Box::new(item),
            },
        ))
    }

    pub fn item(&self) -> &FieldType {
        &self.item
    }
}
