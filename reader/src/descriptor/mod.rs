use snafu::Snafu;

pub use self::class::*;
pub use self::field::*;
pub use self::method::*;

pub mod class;
pub mod field;
pub mod method;

#[derive(Debug, Snafu)]
pub enum DescriptorError {
    #[snafu(display("undecodable descriptor: {input}"))]
    UndecodableDescriptor { input: String },

    #[snafu(display("descriptor has trailing garbage after a valid prefix: {input}"))]
    TooLongDescriptor { input: String },
}

/// Parses a field descriptor (spec §6.1), requiring the whole input to be consumed.
pub fn parse_field_descriptor(input: &str) -> Result<FieldDescriptor, DescriptorError> {
    let (rem, fty) = field::FieldDescriptor::parse(input).map_err(|_| {
        DescriptorError::UndecodableDescriptor {
            input: input.into(),
        }
    })?;
    if rem.is_empty() {
        Ok(fty)
    } else {
        Err(DescriptorError::TooLongDescriptor {
            input: input.into(),
        })
    }
}

/// Parses a method descriptor (spec §6.1), requiring the whole input to be consumed.
pub fn parse_method_descriptor(input: &str) -> Result<MethodDescriptor, DescriptorError> {
    let (rem, mty) = method::MethodDescriptor::parse(input).map_err(|_| {
        DescriptorError::UndecodableDescriptor {
            input: input.into(),
        }
    })?;
    if rem.is_empty() {
        Ok(mty)
    } else {
        Err(DescriptorError::TooLongDescriptor {
            input: input.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_field_descriptor() {
        assert_eq!(
            *parse_field_descriptor("B").unwrap().field_type(),
            FieldType::BaseType(BaseType::Byte)
        );
        assert_eq!(
            *parse_field_descriptor("J").unwrap().field_type(),
            FieldType::BaseType(BaseType::Long)
        );
        assert_eq!(
            *parse_field_descriptor("Z").unwrap().field_type(),
            FieldType::BaseType(BaseType::Boolean)
        );
    }

    #[test]
    fn object_field_descriptor() {
        let string = ObjectType::new(ClassName::new(vec![
            UnqualifiedName::new("java"),
            UnqualifiedName::new("lang"),
            UnqualifiedName::new("String"),
        ]));
        assert_eq!(
            *parse_field_descriptor("Ljava/lang/String;")
                .unwrap()
                .field_type(),
            FieldType::ObjectType(string)
        );
        assert!(parse_field_descriptor("Ljava/lang/Object").is_err());
        assert!(parse_field_descriptor("Ljava/lang/Object;;").is_err());
        assert!(parse_field_descriptor("L[java/lang/Object;").is_err());
    }

    #[test]
    fn array_field_descriptor() {
        assert_eq!(
            *parse_field_descriptor("[B").unwrap().field_type(),
            FieldType::ArrayType(ArrayType::new(FieldType::BaseType(BaseType::Byte)))
        );
        assert!(parse_field_descriptor("[[[B").is_ok());
        assert!(parse_field_descriptor("[[[").is_err());
    }

    #[test]
    fn method_descriptor_slot_counting() {
        let desc = parse_method_descriptor("(IJLjava/lang/String;D)V").unwrap();
        assert_eq!(desc.args_count(), 4);
        assert_eq!(desc.args_slot_count(), 6); // I=1, J=2, L=1, D=2
        assert!(desc.return_type.is_none());
    }

    #[test]
    fn method_descriptor_return_type() {
        let desc = parse_method_descriptor("()I").unwrap();
        assert_eq!(desc.args_count(), 0);
        assert_eq!(desc.return_type, Some(FieldType::BaseType(BaseType::Int)));
    }
}
