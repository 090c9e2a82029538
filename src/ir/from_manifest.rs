//! Manifest-to-IR conversion.

use std::collections::HashMap;

use camino::Utf8PathBuf;

use crate::ast::{BuildManifest, ComponentSpec, TargetKind, TargetSpec, Vars};

use super::{
    BuildGraph, CompileOptions, Component, IrGenError, LinkKind, LinkTarget, graph::check_value,
    rules::standard_rules,
};

type Outputs = HashMap<String, Vec<Utf8PathBuf>>;

impl BuildGraph {
    /// Transform a manifest into a [`BuildGraph`].
    ///
    /// The standard rules are declared first, followed by embedded headers,
    /// nested build files, components and finally link targets.
    ///
    /// # Errors
    ///
    /// Returns [`IrGenError`] for unsupported sources, duplicate outputs or
    /// names, empty components or link targets, and references to unknown
    /// components or subninjas.
    pub fn from_manifest(manifest: &BuildManifest) -> Result<Self, IrGenError> {
        let mut graph = Self::preamble(&manifest.vars)?;
        graph.process_headers(manifest)?;
        let subninjas = graph.process_subninjas(manifest)?;
        let objects = graph.process_components(manifest)?;
        graph.process_targets(manifest, &objects, &subninjas)?;
        Ok(graph)
    }

    /// Create a graph holding only global variables and the standard rules.
    ///
    /// # Errors
    ///
    /// Returns [`IrGenError::MultilineValue`] for a variable value spanning
    /// several lines, or [`IrGenError::DuplicateRule`] if the standard rule
    /// set repeats a name.
    pub fn preamble(vars: &Vars) -> Result<Self, IrGenError> {
        let mut graph = Self::default();
        for (name, value) in vars {
            check_value(name, value)?;
            graph.set_var(name.clone(), value.clone());
        }
        for rule in standard_rules() {
            graph.declare_rule(rule)?;
        }
        Ok(graph)
    }

    fn process_headers(&mut self, manifest: &BuildManifest) -> Result<(), IrGenError> {
        for header in &manifest.headers {
            self.genheader(&header.input, &header.symbol, &header.output)?;
        }
        Ok(())
    }

    fn process_subninjas(&mut self, manifest: &BuildManifest) -> Result<Outputs, IrGenError> {
        let mut libs = Outputs::new();
        for spec in &manifest.subninjas {
            ensure_new_name(&libs, "subninja", &spec.name)?;
            let artifacts = self.subninja(&spec.dir, &spec.artifacts)?;
            libs.insert(spec.name.clone(), artifacts);
        }
        Ok(libs)
    }

    fn process_components(&mut self, manifest: &BuildManifest) -> Result<Outputs, IrGenError> {
        let mut objects = Outputs::new();
        for spec in &manifest.components {
            ensure_new_name(&objects, "component", &spec.name)?;
            let compiled = self.compile(&to_component(spec))?;
            objects.insert(spec.name.clone(), compiled);
        }
        Ok(objects)
    }

    fn process_targets(
        &mut self,
        manifest: &BuildManifest,
        objects: &Outputs,
        subninjas: &Outputs,
    ) -> Result<(), IrGenError> {
        for spec in &manifest.targets {
            let target = resolve_target(spec, objects, subninjas)?;
            self.link(&target)?;
        }
        Ok(())
    }
}

fn ensure_new_name(seen: &Outputs, kind: &'static str, name: &str) -> Result<(), IrGenError> {
    if seen.contains_key(name) {
        return Err(IrGenError::DuplicateName {
            kind,
            name: name.to_owned(),
        });
    }
    Ok(())
}

fn to_component(spec: &ComponentSpec) -> Component {
    let sources = spec.dir.as_ref().map_or_else(
        || spec.sources.clone(),
        |dir| spec.sources.iter().map(|src| dir.join(src)).collect(),
    );
    Component {
        name: spec.name.clone(),
        sources,
        cflags: spec.cflags.clone(),
        options: CompileOptions {
            order_deps: spec.order_deps.clone(),
        },
    }
}

fn resolve_target(
    spec: &TargetSpec,
    objects: &Outputs,
    subninjas: &Outputs,
) -> Result<LinkTarget, IrGenError> {
    let mut inputs = Vec::new();
    for name in &spec.components {
        let found = objects
            .get(name)
            .ok_or_else(|| IrGenError::UnknownComponent {
                target: spec.output.clone(),
                component: name.clone(),
            })?;
        inputs.extend_from_slice(found);
    }
    for name in &spec.subninjas {
        let found = subninjas
            .get(name)
            .ok_or_else(|| IrGenError::UnknownSubninja {
                target: spec.output.clone(),
                subninja: name.clone(),
            })?;
        inputs.extend_from_slice(found);
    }
    inputs.extend_from_slice(&spec.objects);

    let kind = match spec.kind {
        TargetKind::Library => LinkKind::SharedLibrary,
        TargetKind::Executable => LinkKind::Executable,
    };
    Ok(LinkTarget {
        output: spec.output.clone(),
        objects: inputs,
        ldflags: spec.ldflags.clone(),
        kind,
    })
}
