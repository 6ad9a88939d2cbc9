//! Java bridge: class files and Java sources.
//!
//! Java declarations are visible from both languages under their own names.
//! The only interop addition is Kotlin's synthetic property syntax: a getter
//! `getName()` / `isActive()` and a setter `setName(v)` can be spelled
//! `obj.name` / `obj.isActive` from Kotlin.

use crate::bridge::{Derived, Descriptor};
use crate::error::BridgeError;
use crate::frontend::ArtifactKind;
use crate::model::{CONSTRUCTOR_NAME, DeclFlags, DeclKey, Views};
use crate::types::{DeclKind, Language, Namespace, SyntheticKind};

/// Signature marker distinguishing getter and setter aliases of one property.
pub(crate) const GETTER_MARK: &str = "get";
/// See [`GETTER_MARK`].
pub(crate) const SETTER_MARK: &str = "set";

pub(crate) fn derive(desc: &Descriptor<'_>) -> Result<Derived, BridgeError> {
    let statics = DeclFlags {
        is_static: desc.modifiers.is_static,
        ..DeclFlags::default()
    };

    let draft = match desc.kind {
        ArtifactKind::Class | ArtifactKind::Interface | ArtifactKind::Enum => {
            let kind = if desc.container.is_empty() {
                DeclKind::Class
            } else {
                DeclKind::NestedClass
            };
            let key = DeclKey::classifier(desc.package, &desc.member_path(desc.name));
            desc.draft(key, kind, Views::BOTH).with_flags(DeclFlags {
                is_interface: desc.kind == ArtifactKind::Interface,
                is_enum: desc.kind == ArtifactKind::Enum,
                ..statics
            })
        }
        ArtifactKind::Constructor
        | ArtifactKind::PrimaryConstructor
        | ArtifactKind::SecondaryConstructor => {
            constructor_owner(desc)?;
            let descriptor = desc.method_descriptor()?;
            let key = DeclKey::new(
                Namespace::Constructor,
                desc.package,
                &desc.member_path(CONSTRUCTOR_NAME),
                descriptor.as_ref().map(ToString::to_string).as_deref(),
            );
            let kind = if desc.kind == ArtifactKind::PrimaryConstructor {
                DeclKind::PrimaryConstructor
            } else {
                DeclKind::SecondaryConstructor
            };
            desc.draft(key, kind, Views::BOTH)
        }
        ArtifactKind::Method => {
            desc.require_container()?;
            let descriptor = desc.method_descriptor()?;
            let signature = descriptor.as_ref().map(ToString::to_string);
            let key = DeclKey::new(
                Namespace::Method,
                desc.package,
                &desc.member_path(desc.name),
                signature.as_deref(),
            );
            let mut draft = desc
                .draft(key, DeclKind::Method, Views::BOTH)
                .with_flags(statics);

            if let Some(descriptor) = descriptor.filter(|_| !desc.modifiers.is_static) {
                if let Some((property, tag, mark)) = synthetic_property(desc.name, &descriptor) {
                    let alias = DeclKey::new(
                        Namespace::Property,
                        desc.package,
                        &desc.member_path(&property),
                        Some(mark),
                    );
                    draft = draft.with_alias(alias, tag, Language::Kotlin);
                }
            }
            draft
        }
        ArtifactKind::Field => {
            desc.require_container()?;
            desc.field_descriptor()?;
            let key = DeclKey::new(Namespace::Field, desc.package, &desc.member_path(desc.name), None);
            desc.draft(key, DeclKind::Field, Views::BOTH)
                .with_flags(statics)
        }
        ArtifactKind::EnumEntry => {
            desc.require_container()?;
            let key = DeclKey::new(Namespace::Field, desc.package, &desc.member_path(desc.name), None);
            desc.draft(key, DeclKind::EnumEntry, Views::BOTH)
        }
        ArtifactKind::Object
        | ArtifactKind::Companion
        | ArtifactKind::Function
        | ArtifactKind::Property
        | ArtifactKind::TypeAlias => {
            return Err(BridgeError::malformed(
                desc.label(),
                format!("{} has no Java form", desc.kind.as_str()),
            ));
        }
    };

    Ok(Derived {
        drafts: vec![draft],
        links: Vec::new(),
    })
}

/// Constructors name their class and live inside it.
pub(crate) fn constructor_owner(desc: &Descriptor<'_>) -> Result<(), BridgeError> {
    desc.require_container()?;
    match desc.container.last() {
        Some(class) if class == desc.name => Ok(()),
        _ => Err(BridgeError::malformed(
            desc.label(),
            "constructor name does not match its class",
        )),
    }
}

/// Kotlin property name and alias tag for a getter- or setter-shaped method.
fn synthetic_property(
    name: &str,
    descriptor: &crate::bridge::descriptor::MethodDescriptor,
) -> Option<(String, SyntheticKind, &'static str)> {
    if descriptor.is_getter_shaped() {
        if let Some(rest) = accessor_suffix(name, "get") {
            return Some((decapitalize(rest), SyntheticKind::JavaPropertyGetter, GETTER_MARK));
        }
        if descriptor.returns_boolean() && accessor_suffix(name, "is").is_some() {
            return Some((name.to_string(), SyntheticKind::JavaPropertyGetter, GETTER_MARK));
        }
    }
    if descriptor.is_setter_shaped() {
        if let Some(rest) = accessor_suffix(name, "set") {
            return Some((decapitalize(rest), SyntheticKind::JavaPropertySetter, SETTER_MARK));
        }
    }
    None
}

/// `getName` → `Name`; `getname` and `get` are not accessors.
fn accessor_suffix<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = name.strip_prefix(prefix)?;
    rest.chars().next().filter(|c| c.is_uppercase()).map(|_| rest)
}

/// `Name` → `name`, `URL` → `url`, `URLConnection` → `urlConnection`.
fn decapitalize(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let upper_run = chars.iter().take_while(|c| c.is_uppercase()).count();
    let lower_until = match upper_run {
        0 => return name.to_string(),
        n if n == chars.len() || n == 1 => n,
        n => n - 1,
    };
    chars
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            let lowered: Vec<char> = if i < lower_until {
                c.to_lowercase().collect()
            } else {
                vec![*c]
            };
            lowered
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::test_support::{alias_keys, artifact, keys};
    use rstest::rstest;

    fn derive_artifact(artifact: &crate::frontend::LibraryArtifact) -> Result<Derived, BridgeError> {
        crate::bridge::derive(&Descriptor::from_library(artifact))
    }

    #[test]
    fn each_constructor_overload_is_its_own_draft() {
        let one = artifact(Language::Java, ArtifactKind::Constructor, "lib", &["Foo"], "Foo", Some("(I)V"));
        let two = artifact(Language::Java, ArtifactKind::Constructor, "lib", &["Foo"], "Foo", Some("(II)V"));

        let first = derive_artifact(&one).expect("should derive");
        let second = derive_artifact(&two).expect("should derive");

        assert_eq!(keys(&first), vec!["constructor:lib/Foo.<init>#(I)V"]);
        assert_eq!(keys(&second), vec!["constructor:lib/Foo.<init>#(II)V"]);
        assert_eq!(first.drafts[0].kind, DeclKind::SecondaryConstructor);
    }

    #[test]
    fn constructor_name_must_match_class() {
        let ctor = artifact(Language::Java, ArtifactKind::Constructor, "lib", &["Foo"], "Bar", Some("()V"));
        assert!(derive_artifact(&ctor).is_err());
    }

    #[test]
    fn static_members_are_flagged() {
        let mut field = artifact(Language::Java, ArtifactKind::Field, "lib", &["Foo"], "COUNT", Some("I"));
        field.modifiers.is_static = true;

        let derived = derive_artifact(&field).expect("should derive");
        assert!(derived.drafts[0].flags.is_static);
        assert_eq!(keys(&derived), vec!["field:lib/Foo.COUNT"]);
    }

    #[test]
    fn nested_class_kind_depends_on_container() {
        let nested = artifact(Language::Java, ArtifactKind::Interface, "lib", &["Outer"], "Inner", None);
        let derived = derive_artifact(&nested).expect("should derive");

        assert_eq!(derived.drafts[0].kind, DeclKind::NestedClass);
        assert!(derived.drafts[0].flags.is_interface);
    }

    #[rstest]
    #[case::getter("getName", "()Ljava/lang/String;", "property:lib/Foo.name#get")]
    #[case::boolean_getter("isActive", "()Z", "property:lib/Foo.isActive#get")]
    #[case::setter("setName", "(Ljava/lang/String;)V", "property:lib/Foo.name#set")]
    #[case::acronym("getURL", "()Ljava/lang/String;", "property:lib/Foo.url#get")]
    fn accessors_get_kotlin_property_alias(
        #[case] name: &str,
        #[case] descriptor: &str,
        #[case] alias: &str,
    ) {
        let method = artifact(Language::Java, ArtifactKind::Method, "lib", &["Foo"], name, Some(descriptor));
        let derived = derive_artifact(&method).expect("should derive");

        assert_eq!(alias_keys(&derived.drafts[0]), vec![alias.to_string()]);
        assert_eq!(derived.drafts[0].aliases[0].view, Language::Kotlin);
    }

    #[rstest]
    #[case::void_getter("getName", "()V")]
    #[case::getter_with_args("getName", "(I)Ljava/lang/String;")]
    #[case::lowercase_suffix("getname", "()I")]
    #[case::non_boolean_is("isActive", "()I")]
    #[case::setter_returning("setName", "(I)I")]
    fn non_accessors_get_no_alias(#[case] name: &str, #[case] descriptor: &str) {
        let method = artifact(Language::Java, ArtifactKind::Method, "lib", &["Foo"], name, Some(descriptor));
        let derived = derive_artifact(&method).expect("should derive");
        assert!(derived.drafts[0].aliases.is_empty());
    }

    #[test]
    fn static_getter_gets_no_alias() {
        let mut method = artifact(Language::Java, ArtifactKind::Method, "lib", &["Foo"], "getName", Some("()I"));
        method.modifiers.is_static = true;
        let derived = derive_artifact(&method).expect("should derive");
        assert!(derived.drafts[0].aliases.is_empty());
    }

    #[rstest]
    #[case::object(ArtifactKind::Object)]
    #[case::function(ArtifactKind::Function)]
    #[case::type_alias(ArtifactKind::TypeAlias)]
    fn kotlin_only_kinds_are_malformed(#[case] kind: ArtifactKind) {
        let odd = artifact(Language::Java, kind, "lib", &[], "Thing", None);
        assert!(derive_artifact(&odd).is_err());
    }

    #[test]
    fn member_without_owner_is_malformed() {
        let method = artifact(Language::Java, ArtifactKind::Method, "lib", &[], "run", Some("()V"));
        let err = derive_artifact(&method).expect_err("should reject");
        assert!(err.to_string().contains("without an owner"));
    }

    #[rstest]
    #[case("Name", "name")]
    #[case("URL", "url")]
    #[case("URLConnection", "urlConnection")]
    #[case("x", "x")]
    fn decapitalize_follows_kotlin_rules(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(decapitalize(input), expected);
    }
}
