//! Kotlin bridge: Kotlin metadata and Kotlin sources.
//!
//! Kotlin constructs compile to JVM shapes Java code names differently:
//!
//! | Kotlin | Java spelling | Alias tag |
//! |--------|---------------|-----------|
//! | `object Bar` | `Bar.INSTANCE` | `object-instance-accessor` |
//! | `companion object` | `Foo.Companion` | `companion-as-static-accessor` |
//! | top-level `fun f()` in `utils.kt` | `UtilsKt.f()` | `top-level-holder-member` |
//! | `val x` | `getX()` | `property-getter` |
//! | `var x` | `setX(v)` | `property-setter` |
//! | `const val X` / `@JvmField val x` | field `X` / `x` | `property-field` |
//! | `typealias F = Foo` | none, Kotlin only | `type-alias` |

use std::sync::Arc;

use crate::bridge::descriptor::{FieldType, MethodDescriptor};
use crate::bridge::java::constructor_owner;
use crate::bridge::{AliasLink, DeclDraft, Derived, Descriptor};
use crate::error::BridgeError;
use crate::frontend::ArtifactKind;
use crate::model::{CONSTRUCTOR_NAME, DeclFlags, DeclKey, Views};
use crate::types::{DeclKind, Language, Namespace, SyntheticKind};

/// Name of the static field holding an object's instance.
pub const INSTANCE_FIELD: &str = "INSTANCE";

pub(crate) fn derive(desc: &Descriptor<'_>) -> Result<Derived, BridgeError> {
    let mut derived = Derived::default();
    let nested = !desc.container.is_empty();

    match desc.kind {
        ArtifactKind::Class | ArtifactKind::Interface | ArtifactKind::Enum => {
            let kind = if nested {
                DeclKind::NestedClass
            } else {
                DeclKind::Class
            };
            let key = DeclKey::classifier(desc.package, &desc.member_path(desc.name));
            derived.drafts.push(desc.draft(key, kind, Views::BOTH).with_flags(DeclFlags {
                is_interface: desc.kind == ArtifactKind::Interface,
                is_enum: desc.kind == ArtifactKind::Enum,
                ..DeclFlags::default()
            }));
        }
        ArtifactKind::Object => {
            let path = desc.member_path(desc.name);
            let key = DeclKey::classifier(desc.package, &path);
            let instance: Vec<&str> = path.iter().copied().chain([INSTANCE_FIELD]).collect();
            derived.drafts.push(
                desc.draft(key, DeclKind::Object, Views::BOTH).with_alias(
                    DeclKey::new(Namespace::Field, desc.package, &instance, None),
                    SyntheticKind::ObjectInstanceAccessor,
                    Language::Java,
                ),
            );
        }
        ArtifactKind::Companion => {
            desc.require_container()?;
            let path = desc.member_path(desc.name);
            let key = DeclKey::classifier(desc.package, &path);
            derived.drafts.push(
                desc.draft(key, DeclKind::CompanionSingleton, Views::BOTH).with_alias(
                    DeclKey::new(Namespace::Field, desc.package, &path, None),
                    SyntheticKind::CompanionAsStaticAccessor,
                    Language::Java,
                ),
            );
        }
        ArtifactKind::PrimaryConstructor
        | ArtifactKind::SecondaryConstructor
        | ArtifactKind::Constructor => {
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
            derived.drafts.push(desc.draft(key, kind, Views::BOTH));
        }
        ArtifactKind::Method => {
            desc.require_container()?;
            let descriptor = desc.method_descriptor()?;
            let key = DeclKey::new(
                Namespace::Method,
                desc.package,
                &desc.member_path(desc.name),
                descriptor.as_ref().map(ToString::to_string).as_deref(),
            );
            let mut draft = desc.draft(key, DeclKind::Method, Views::BOTH);
            draft.jvm_static = desc.modifiers.jvm_static;
            derived.drafts.push(draft);
        }
        ArtifactKind::Function => {
            let holder = top_level_holder(desc)?;
            let descriptor = desc.method_descriptor()?;
            let signature = descriptor.as_ref().map(ToString::to_string);
            let key = DeclKey::new(
                Namespace::Function,
                desc.package,
                &[desc.name],
                signature.as_deref(),
            );
            let java_name = desc.jvm_name.unwrap_or(desc.name);
            derived.drafts.push(
                desc.draft(key, DeclKind::TopLevelFunction, Views::only(Language::Kotlin))
                    .with_alias(
                        DeclKey::new(
                            Namespace::Method,
                            desc.package,
                            &[&*holder, java_name],
                            signature.as_deref(),
                        ),
                        SyntheticKind::TopLevelHolderMember,
                        Language::Java,
                    ),
            );
            derived.drafts.push(holder_draft(desc, &holder));
        }
        ArtifactKind::Property => {
            let field_type = desc.field_descriptor()?;
            let top_level = !nested;
            let holder = if top_level {
                Some(top_level_holder(desc)?)
            } else {
                None
            };
            let accessor_owner: Vec<&str> = match &holder {
                Some(holder) => vec![&**holder],
                None => desc.container.iter().map(String::as_str).collect(),
            };

            let key = DeclKey::new(
                Namespace::Property,
                desc.package,
                &desc.member_path(desc.name),
                None,
            );
            let mut draft = desc
                .draft(key, DeclKind::Property, Views::only(Language::Kotlin))
                .with_flags(DeclFlags {
                    is_const: desc.modifiers.is_const,
                    ..DeclFlags::default()
                });
            draft = with_property_aliases(draft, desc, &accessor_owner, field_type);
            derived.drafts.push(draft);
            if let Some(holder) = holder {
                derived.drafts.push(holder_draft(desc, &holder));
            }
        }
        ArtifactKind::EnumEntry => {
            desc.require_container()?;
            let key = DeclKey::new(
                Namespace::Field,
                desc.package,
                &desc.member_path(desc.name),
                None,
            );
            derived
                .drafts
                .push(desc.draft(key, DeclKind::EnumEntry, Views::BOTH));
        }
        ArtifactKind::Field => {
            desc.require_container()?;
            desc.field_descriptor()?;
            let key = DeclKey::new(
                Namespace::Field,
                desc.package,
                &desc.member_path(desc.name),
                None,
            );
            derived.drafts.push(
                desc.draft(key, DeclKind::Field, Views::BOTH)
                    .with_flags(DeclFlags {
                        is_static: desc.modifiers.is_static,
                        ..DeclFlags::default()
                    }),
            );
        }
        ArtifactKind::TypeAlias => {
            if nested {
                return Err(BridgeError::malformed(desc.label(), "nested typealias"));
            }
            let target = desc
                .alias_target
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| BridgeError::malformed(desc.label(), "typealias without target"))?;
            derived.links.push(AliasLink {
                alias: DeclKey::classifier(desc.package, &[desc.name]),
                target: target.split('.').map(str::to_string).collect(),
                artifact: desc.label(),
            });
        }
    }

    Ok(derived)
}

/// Holder class of a top-level declaration.
fn top_level_holder(desc: &Descriptor<'_>) -> Result<Arc<str>, BridgeError> {
    if !desc.container.is_empty() {
        return Err(BridgeError::malformed(
            desc.label(),
            format!("top-level {} inside a classifier", desc.kind.as_str()),
        ));
    }
    desc.holder
        .clone()
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| BridgeError::malformed(desc.label(), "top-level declaration without holder class"))
}

/// The Java-only facade class for a file's top-level declarations.
fn holder_draft(desc: &Descriptor<'_>, holder: &Arc<str>) -> DeclDraft {
    let key = DeclKey::classifier(desc.package, &[&**holder]);
    let mut draft = desc
        .draft(key, DeclKind::Class, Views::only(Language::Java))
        .synthetic(SyntheticKind::TopLevelHolderClass);
    draft.name = Arc::clone(holder);
    draft.source = None;
    draft.supertypes.clear();
    draft.artifact = format!("{}/{holder}", desc.package);
    draft
}

fn member<'s>(owner: &[&'s str], name: &'s str) -> Vec<&'s str> {
    owner.iter().copied().chain(std::iter::once(name)).collect()
}

/// Java spellings of a property: a field for `const`/`@JvmField`, accessors otherwise.
fn with_property_aliases(
    mut draft: DeclDraft,
    desc: &Descriptor<'_>,
    owner: &[&str],
    field_type: Option<FieldType>,
) -> DeclDraft {
    if desc.modifiers.is_const || desc.modifiers.jvm_field {
        let key = DeclKey::new(Namespace::Field, desc.package, &member(owner, desc.name), None);
        draft = draft.with_alias(key, SyntheticKind::PropertyField, Language::Java);
        return draft;
    }

    let getter = desc
        .jvm_name
        .map_or_else(|| getter_name(desc.name), ToString::to_string);
    let getter_signature = field_type
        .clone()
        .map(|ty| MethodDescriptor::getter(ty).to_string());
    let key = DeclKey::new(
        Namespace::Method,
        desc.package,
        &member(owner, &getter),
        getter_signature.as_deref(),
    );
    draft = draft.with_alias(key, SyntheticKind::PropertyGetter, Language::Java);

    if desc.modifiers.is_mutable {
        let setter = setter_name(desc.name);
        let setter_signature = field_type.map(|ty| MethodDescriptor::setter(ty).to_string());
        let key = DeclKey::new(
            Namespace::Method,
            desc.package,
            &member(owner, &setter),
            setter_signature.as_deref(),
        );
        draft = draft.with_alias(key, SyntheticKind::PropertySetter, Language::Java);
    }
    draft
}

fn is_prefixed(name: &str) -> bool {
    name.strip_prefix("is")
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_uppercase)
}

/// `name` → `getName`; `isOpen` stays `isOpen`.
#[must_use]
pub fn getter_name(property: &str) -> String {
    if is_prefixed(property) {
        property.to_string()
    } else {
        format!("get{}", capitalize(property))
    }
}

/// `name` → `setName`; `isOpen` → `setOpen`.
#[must_use]
pub fn setter_name(property: &str) -> String {
    match property.strip_prefix("is").filter(|_| is_prefixed(property)) {
        Some(rest) => format!("set{rest}"),
        None => format!("set{}", capitalize(property)),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
