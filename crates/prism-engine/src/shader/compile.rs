use std::fmt;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::Error;

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ScalarType {
    Float,
    Sint,
    Uint,
    Bool,
}

/// Type of a value passed between stages or fed from a vertex attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct IoType {
    pub scalar: ScalarType,
    pub components: u8,
}

impl IoType {
    pub const fn new(scalar: ScalarType, components: u8) -> Self {
        Self { scalar, components }
    }
}

impl fmt::Display for IoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scalar = match self.scalar {
            ScalarType::Float => "f32",
            ScalarType::Sint => "i32",
            ScalarType::Uint => "u32",
            ScalarType::Bool => "bool",
        };
        match self.components {
            1 => f.write_str(scalar),
            n => write!(f, "vec{n}<{scalar}>"),
        }
    }
}

/// A location-bound stage input or output.
#[derive(Debug, Clone, PartialEq)]
pub struct StageVar {
    pub name: String,
    pub location: u32,
    pub ty: IoType,
}

/// A uniform declared by one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageUniform {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub size: u32,
    /// Canonical WGSL spelling of the type, used to compare stages.
    pub ty: String,
}

/// One validated shader stage together with its reflected interface.
#[derive(Debug, Clone)]
pub struct CompiledShader {
    stage: ShaderStage,
    source: String,
    entry_point: String,
    inputs: Vec<StageVar>,
    outputs: Vec<StageVar>,
    uniforms: Vec<StageUniform>,
}

impl CompiledShader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn inputs(&self) -> &[StageVar] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[StageVar] {
        &self.outputs
    }

    pub fn uniforms(&self) -> &[StageUniform] {
        &self.uniforms
    }
}

/// Parses and validates WGSL source for `stage`.
///
/// The module must contain an entry point for `stage`. On failure the error
/// carries the full diagnostic log, which is never empty.
pub fn compile(stage: ShaderStage, source: &str) -> Result<CompiledShader, Error> {
    let failed = |log: String| Error::ShaderCompileFailed { stage, log };

    if source.trim().is_empty() {
        return Err(failed("shader source is empty".to_string()));
    }

    let module = naga::front::wgsl::parse_str(source).map_err(|e| failed(e.emit_to_string(source)))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::default());
    validator
        .validate(&module)
        .map_err(|e| failed(validation_log(e.as_inner())))?;

    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage.to_naga())
        .ok_or_else(|| failed(format!("no @{stage} entry point found")))?;

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_io(&module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = entry.function.result.as_ref() {
        collect_io(&module, None, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let uniforms = module
        .global_variables
        .iter()
        .filter(|(_, var)| matches!(var.space, naga::AddressSpace::Uniform))
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            let inner = &module.types[var.ty].inner;
            Some(StageUniform {
                name: var.name.clone().unwrap_or_default(),
                group: binding.group,
                binding: binding.binding,
                size: inner.size(module.to_ctx()),
                ty: describe_type(&module, var.ty),
            })
        })
        .collect();

    log::debug!(
        "compiled {stage} shader `{}` ({} inputs, {} outputs)",
        entry.name,
        inputs.len(),
        outputs.len()
    );

    Ok(CompiledShader {
        stage,
        source: source.to_string(),
        entry_point: entry.name.clone(),
        inputs,
        outputs,
        uniforms,
    })
}

fn validation_log(err: &dyn std::error::Error) -> String {
    let mut log = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        log.push_str("\n  caused by: ");
        log.push_str(&cause.to_string());
        source = cause.source();
    }
    log
}

/// Flattens a (possibly struct-typed) argument or result into location-bound vars.
fn collect_io(
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<StageVar>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            if let Some(io) = io_type(&module.types[ty].inner) {
                out.push(StageVar {
                    name: name.unwrap_or_default().to_string(),
                    location: *location,
                    ty: io,
                });
            }
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_io(
                        module,
                        member.name.as_deref(),
                        member.ty,
                        member.binding.as_ref(),
                        out,
                    );
                }
            }
        }
    }
}

fn scalar_type(kind: naga::ScalarKind) -> ScalarType {
    match kind {
        naga::ScalarKind::Float | naga::ScalarKind::AbstractFloat => ScalarType::Float,
        naga::ScalarKind::Sint | naga::ScalarKind::AbstractInt => ScalarType::Sint,
        naga::ScalarKind::Uint => ScalarType::Uint,
        naga::ScalarKind::Bool => ScalarType::Bool,
    }
}

fn io_type(inner: &naga::TypeInner) -> Option<IoType> {
    match *inner {
        naga::TypeInner::Scalar(s) => Some(IoType::new(scalar_type(s.kind), 1)),
        naga::TypeInner::Vector { size, scalar } => {
            Some(IoType::new(scalar_type(scalar.kind), size as u8))
        }
        _ => None,
    }
}

fn describe_scalar(s: naga::Scalar) -> String {
    let prefix = match s.kind {
        naga::ScalarKind::Float | naga::ScalarKind::AbstractFloat => "f",
        naga::ScalarKind::Sint | naga::ScalarKind::AbstractInt => "i",
        naga::ScalarKind::Uint => "u",
        naga::ScalarKind::Bool => return "bool".to_string(),
    };
    format!("{prefix}{}", s.width as u32 * 8)
}

fn describe_type(module: &naga::Module, ty: naga::Handle<naga::Type>) -> String {
    let ty = &module.types[ty];
    match ty.inner {
        naga::TypeInner::Scalar(s) => describe_scalar(s),
        naga::TypeInner::Vector { size, scalar } => {
            format!("vec{}<{}>", size as u8, describe_scalar(scalar))
        }
        naga::TypeInner::Matrix { columns, rows, scalar } => format!(
            "mat{}x{}<{}>",
            columns as u8,
            rows as u8,
            describe_scalar(scalar)
        ),
        naga::TypeInner::Struct { span, .. } => match ty.name.as_deref() {
            Some(name) => format!("{name} ({span} bytes)"),
            None => format!("struct ({span} bytes)"),
        },
        ref other => format!("{other:?}"),
    }
}
