//! Pass 3: Nullable wrapping
//!
//! An optional single-valued scalar member (`minOccurs = 0`,
//! `maxOccurs = 1`) cannot express "absent" with a plain value type. This pass
//! wraps its type in `Nullable`. Collections, reference-typed members and
//! members that are already nullable are left alone, so running the pass
//! twice changes nothing.

use crate::config::TransformOptions;
use crate::ir::{Member, MemberKind, SchemaIr, TypeReference};

use super::pass_result::PassResult;

pub fn wrap_nullable(schema: &mut SchemaIr, config: &TransformOptions) -> PassResult {
    if !config.nullable_types {
        return PassResult::empty();
    }

    let mut targets = Vec::new();
    for (t, decl) in schema.types.iter().enumerate() {
        for (m, member) in decl.members.iter().enumerate() {
            if is_candidate(member) && schema.is_scalar(&member.declared_type) {
                targets.push((t, m));
            }
        }
    }

    for &(t, m) in &targets {
        let member = &mut schema.types[t].members[m];
        let inner = std::mem::replace(&mut member.declared_type, TypeReference::object("object"));
        member.declared_type = TypeReference::nullable(inner);
    }

    tracing::debug!(wrapped = targets.len(), "wrapped optional members in nullable");
    PassResult::empty()
}

fn is_candidate(member: &Member) -> bool {
    matches!(member.kind, MemberKind::Element | MemberKind::Attribute)
        && member.min_occurs == 0
        && member.max_occurs == Some(1)
        && !member.declared_type.is_collection()
        && !member.declared_type.is_nullable()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TypeDeclaration;
    use pretty_assertions::assert_eq;

    fn config() -> TransformOptions {
        TransformOptions {
            nullable_types: true,
            ..TransformOptions::default()
        }
    }

    fn schema() -> SchemaIr {
        let mut schema = SchemaIr::new("a.xsd");
        schema.push(TypeDeclaration::enumeration("Color"));
        schema.push(
            TypeDeclaration::class("Item")
                .with_member(
                    Member::element("count", TypeReference::scalar("int")).with_occurs(0, Some(1)),
                )
                .with_member(
                    Member::attribute("color", TypeReference::declared("Color"))
                        .with_occurs(0, Some(1)),
                )
                .with_member(
                    Member::element("name", TypeReference::object("string"))
                        .with_occurs(0, Some(1)),
                )
                .with_member(Member::element("required", TypeReference::scalar("int")))
                .with_member(
                    Member::element("data", TypeReference::array(TypeReference::scalar("byte")))
                        .with_occurs(0, Some(1)),
                ),
        );
        schema
    }

    // Test 1: optional scalars and enums are wrapped, others untouched
    #[test]
    fn test_wraps_optional_scalars() {
        let mut schema = schema();
        wrap_nullable(&mut schema, &config());

        let members = &schema.types[1].members;
        assert_eq!(
            members[0].declared_type,
            TypeReference::nullable(TypeReference::scalar("int"))
        );
        assert_eq!(
            members[1].declared_type,
            TypeReference::nullable(TypeReference::declared("Color"))
        );
        assert_eq!(members[2].declared_type, TypeReference::object("string"));
        assert_eq!(members[3].declared_type, TypeReference::scalar("int"));
        assert_eq!(
            members[4].declared_type,
            TypeReference::array(TypeReference::scalar("byte"))
        );
    }

    // Test 2: idempotent
    #[test]
    fn test_idempotent() {
        let mut once = schema();
        wrap_nullable(&mut once, &config());
        let mut twice = once.clone();
        wrap_nullable(&mut twice, &config());
        assert_eq!(once, twice);
    }

    // Test 3: flag off is a no-op
    #[test]
    fn test_disabled() {
        let mut schema = schema();
        let before = schema.clone();
        wrap_nullable(&mut schema, &TransformOptions::default());
        assert_eq!(schema, before);
    }

    // Test 4: repeated optional members are not candidates
    #[test]
    fn test_repeated_member_not_wrapped() {
        let mut schema = SchemaIr::new("a.xsd");
        schema.push(TypeDeclaration::class("Item").with_member(
            Member::element("values", TypeReference::scalar("int")).with_occurs(0, None),
        ));
        wrap_nullable(&mut schema, &config());
        assert_eq!(
            schema.types[0].members[0].declared_type,
            TypeReference::scalar("int")
        );
    }
}
