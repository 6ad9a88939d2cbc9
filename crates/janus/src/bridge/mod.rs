//! Library bridge: turns front-end descriptors into declaration drafts.
//!
//! Source declarations and library artifacts obey the same interop rules, so
//! both are viewed through one [`Descriptor`] and handed to the bridge of the
//! language that wrote them. Each bridge emits [`DeclDraft`]s carrying their
//! interop aliases; the index merges drafts that share an identity.
//!
//! Derivation is per descriptor and runs in parallel. Drafts do not know their
//! owners yet: owner existence, enum membership, `@JvmStatic` copies and type
//! alias targets are checked when the index merges.

pub mod descriptor;
pub mod java;
pub mod kotlin;

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::cancel::CancellationToken;
use crate::error::{BridgeError, Result};
use crate::frontend::{ArtifactKind, LibraryArtifact, Modifiers, SourceDeclaration, SourceFile};
use crate::model::{Alias, DeclFlags, DeclKey, SourceLocation, Views};
use crate::parallel::par_map_checked;
use crate::types::{DeclKind, Language, Namespace, Origin, SyntheticKind, TextRange};

/// Where a descriptor came from.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Provenance<'a> {
    /// Declared in an analyzed file
    Source {
        file: &'a Path,
        range: TextRange,
        name_range: TextRange,
    },
    /// Compiled dependency
    Library,
}

/// Borrowed, provenance-agnostic view of one declaration report.
#[derive(Debug, Clone)]
pub(crate) struct Descriptor<'a> {
    pub language: Language,
    pub kind: ArtifactKind,
    pub package: &'a str,
    pub container: &'a [String],
    pub name: &'a str,
    pub signature: Option<&'a str>,
    pub modifiers: Modifiers,
    pub supertypes: &'a [String],
    pub jvm_name: Option<&'a str>,
    pub holder: Option<Arc<str>>,
    pub alias_target: Option<&'a str>,
    pub provenance: Provenance<'a>,
}

impl<'a> Descriptor<'a> {
    pub(crate) fn from_source(
        file: &'a SourceFile,
        decl: &'a SourceDeclaration,
        holder: &Arc<str>,
    ) -> Self {
        Self {
            language: file.language,
            kind: decl.kind,
            package: &file.package,
            container: &decl.container,
            name: &decl.name,
            signature: decl.signature.as_deref(),
            modifiers: decl.modifiers,
            supertypes: &decl.supertypes,
            jvm_name: decl.jvm_name.as_deref(),
            holder: Some(Arc::clone(holder)),
            alias_target: decl.alias_target.as_deref(),
            provenance: Provenance::Source {
                file: &file.path,
                range: decl.range,
                name_range: decl.name_range,
            },
        }
    }

    pub(crate) fn from_library(artifact: &'a LibraryArtifact) -> Self {
        Self {
            language: artifact.language,
            kind: artifact.kind,
            package: &artifact.package,
            container: &artifact.container,
            name: &artifact.name,
            signature: artifact.descriptor.as_deref(),
            modifiers: artifact.modifiers,
            supertypes: &artifact.supertypes,
            jvm_name: artifact.jvm_name.as_deref(),
            holder: artifact.facade.as_deref().map(Arc::from),
            alias_target: artifact.alias_target.as_deref(),
            provenance: Provenance::Library,
        }
    }

    /// Label used in warnings, e.g. `lib/Foo.bar(I)V`.
    pub(crate) fn label(&self) -> String {
        let mut label = format!("{}/", self.package);
        for segment in self.container {
            label.push_str(segment);
            label.push('.');
        }
        label.push_str(self.name);
        if let Some(signature) = self.signature {
            label.push_str(signature);
        }
        if let Provenance::Source { file, .. } = self.provenance {
            label.push_str(&format!(" ({})", file.display()));
        }
        label
    }

    /// Key path of a member named `name` inside this descriptor's container.
    pub(crate) fn member_path<'s>(&'s self, name: &'s str) -> Vec<&'s str> {
        self.container
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name))
            .collect()
    }

    fn origin(&self) -> Origin {
        match self.provenance {
            Provenance::Source { .. } => Origin::Source,
            Provenance::Library => Origin::Library,
        }
    }

    fn source_location(&self) -> Option<SourceLocation> {
        match self.provenance {
            Provenance::Source {
                file,
                range,
                name_range,
            } => Some(SourceLocation {
                file: file.to_path_buf(),
                range,
                name_range,
            }),
            Provenance::Library => None,
        }
    }

    /// JVM-style reference for library declarations: `lib/Outer$Inner.bar(I)V`.
    fn external_signature(&self, key: &DeclKey) -> Option<String> {
        if !matches!(self.provenance, Provenance::Library) {
            return None;
        }
        let mut out = self.package.replace('.', "/");
        if !out.is_empty() {
            out.push('/');
        }
        let binary = |segments: &[Arc<str>]| {
            segments.iter().map(|s| &**s).collect::<Vec<_>>().join("$")
        };
        if key.namespace() == Namespace::Type {
            out.push_str(&binary(key.path()));
        } else {
            out.push_str(&binary(key.container_path()));
            out.push('.');
            out.push_str(key.name());
        }
        if let Some(signature) = key.signature() {
            out.push_str(signature);
        } else if let Some(signature) = self.signature {
            out.push(':');
            out.push_str(signature);
        }
        Some(out)
    }

    /// Start a draft for `key` with this descriptor's provenance.
    pub(crate) fn draft(&self, key: DeclKey, kind: DeclKind, views: Views) -> DeclDraft {
        DeclDraft {
            external_signature: self.external_signature(&key),
            key,
            name: Arc::from(self.name),
            kind,
            origin: self.origin(),
            language: self.language,
            synthetic: None,
            source: self.source_location(),
            flags: DeclFlags::default(),
            views,
            aliases: Vec::new(),
            supertypes: self.supertypes.to_vec(),
            artifact: self.label(),
            jvm_static: false,
        }
    }

    /// Reject descriptors no bridge can use.
    pub(crate) fn validate(&self) -> std::result::Result<(), BridgeError> {
        if self.name.trim().is_empty() {
            return Err(BridgeError::malformed(self.label(), "empty name"));
        }
        if self.container.iter().any(|segment| segment.trim().is_empty()) {
            return Err(BridgeError::malformed(self.label(), "empty owner segment"));
        }
        if let Provenance::Source {
            range, name_range, ..
        } = self.provenance
            && (range.is_inverted() || name_range.is_inverted())
        {
            return Err(BridgeError::malformed(self.label(), "inverted source range"));
        }
        Ok(())
    }

    /// Validate a JVM method descriptor, if one is present.
    pub(crate) fn method_descriptor(
        &self,
    ) -> std::result::Result<Option<descriptor::MethodDescriptor>, BridgeError> {
        self.signature
            .map(descriptor::parse_method)
            .transpose()
            .map_err(|e| BridgeError::malformed(self.label(), e.to_string()))
    }

    /// Validate a JVM field descriptor, if one is present.
    pub(crate) fn field_descriptor(
        &self,
    ) -> std::result::Result<Option<descriptor::FieldType>, BridgeError> {
        self.signature
            .map(descriptor::parse_field)
            .transpose()
            .map_err(|e| BridgeError::malformed(self.label(), e.to_string()))
    }

    /// Require an owning classifier for members.
    pub(crate) fn require_container(&self) -> std::result::Result<(), BridgeError> {
        if self.container.is_empty() {
            Err(BridgeError::malformed(
                self.label(),
                format!("{} without an owner", self.kind.as_str()),
            ))
        } else {
            Ok(())
        }
    }
}

/// One declaration as a single feed reported it.
#[derive(Debug, Clone)]
pub(crate) struct DeclDraft {
    pub key: DeclKey,
    pub name: Arc<str>,
    pub kind: DeclKind,
    pub origin: Origin,
    pub language: Language,
    pub synthetic: Option<SyntheticKind>,
    pub source: Option<SourceLocation>,
    pub external_signature: Option<String>,
    pub flags: DeclFlags,
    pub views: Views,
    pub aliases: Vec<Alias>,
    pub supertypes: Vec<String>,
    pub artifact: String,
    /// `@JvmStatic`; the outer-class copy is attached once the owner is known
    pub jvm_static: bool,
}

impl DeclDraft {
    pub(crate) fn with_flags(mut self, flags: DeclFlags) -> Self {
        self.flags = flags;
        self
    }

    pub(crate) fn with_alias(mut self, key: DeclKey, synthetic: SyntheticKind, view: Language) -> Self {
        self.aliases.push(Alias {
            key,
            synthetic,
            view,
        });
        self
    }

    pub(crate) fn synthetic(mut self, kind: SyntheticKind) -> Self {
        self.synthetic = Some(kind);
        self
    }

    /// Total order used before merging, so merges never depend on input order.
    pub(crate) fn sort_key(&self) -> (&DeclKey, u8, Origin, Language, &str) {
        (
            &self.key,
            self.kind.specificity(),
            self.origin,
            self.language,
            &self.artifact,
        )
    }
}

/// A Kotlin `typealias`, resolved once classifiers are known.
#[derive(Debug, Clone)]
pub(crate) struct AliasLink {
    pub alias: DeclKey,
    pub target: Vec<String>,
    pub artifact: String,
}

/// What one descriptor contributes.
#[derive(Debug, Default)]
pub(crate) struct Derived {
    pub drafts: Vec<DeclDraft>,
    pub links: Vec<AliasLink>,
}

/// Everything the bridges produced for one build.
#[derive(Debug, Default)]
pub(crate) struct BridgeOutput {
    pub drafts: Vec<DeclDraft>,
    pub links: Vec<AliasLink>,
    pub errors: Vec<BridgeError>,
}

impl BridgeOutput {
    fn absorb(&mut self, result: std::result::Result<Derived, BridgeError>) {
        match result {
            Ok(derived) => {
                self.drafts.extend(derived.drafts);
                self.links.extend(derived.links);
            }
            Err(error) => self.errors.push(error),
        }
    }
}

/// Derive drafts for one descriptor with the bridge of its language.
pub(crate) fn derive(descriptor: &Descriptor<'_>) -> std::result::Result<Derived, BridgeError> {
    descriptor.validate()?;
    match descriptor.language {
        Language::Kotlin => kotlin::derive(descriptor),
        Language::Java => java::derive(descriptor),
    }
}

/// Run both bridges over every source declaration and library artifact.
///
/// # Errors
///
/// Returns `Error::Cancelled` if `cancel` fires before all descriptors are
/// derived. Malformed descriptors are not errors; they land in
/// [`BridgeOutput::errors`].
pub(crate) fn derive_all(
    files: &[SourceFile],
    libraries: &[LibraryArtifact],
    cancel: &CancellationToken,
) -> Result<BridgeOutput> {
    let per_file = par_map_checked(files, cancel, |_, file| {
        let holder: Arc<str> = Arc::from(file.holder_class_name());
        let mut output = BridgeOutput::default();
        for decl in &file.declarations {
            output.absorb(derive(&Descriptor::from_source(file, decl, &holder)));
        }
        output
    })?;
    let per_artifact = par_map_checked(libraries, cancel, |_, artifact| {
        derive(&Descriptor::from_library(artifact))
    })?;

    let mut output = BridgeOutput::default();
    for file_output in per_file {
        output.drafts.extend(file_output.drafts);
        output.links.extend(file_output.links);
        output.errors.extend(file_output.errors);
    }
    for result in per_artifact {
        output.absorb(result);
    }

    debug!(
        drafts = output.drafts.len(),
        links = output.links.len(),
        errors = output.errors.len(),
        "Bridged declarations"
    );
    Ok(output)
}
