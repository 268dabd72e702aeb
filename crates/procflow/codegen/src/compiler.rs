//! Process compiler
//!
//! Drives the emitters over one process model in a fixed order and
//! assembles their output into a `CompiledProcess`.

use crate::context::{Emission, EmissionContext};
use crate::emit::{approval, conditions, failure, fields, fork, not_found, start, step};
use crate::error::{CodegenError, CodegenResult};
use crate::ir::CompiledProcess;
use crate::{render, CompilerConfig};
use procflow_model::ProcessModel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Generated Source ─────────────────────────────────────────────────

/// Rendered Rust source for one process type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSource {
    pub process: String,
    pub content: String,
    /// Hash of the content, for change detection
    pub content_hash: String,
}

impl GeneratedSource {
    pub fn new(process: impl Into<String>, content: String) -> Self {
        let content_hash = Self::compute_hash(&content);
        Self {
            process: process.into(),
            content,
            content_hash,
        }
    }

    /// FNV-1a over the content. Stable across runs and toolchains.
    pub fn compute_hash(content: &str) -> String {
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in content.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x100000001b3);
        }
        format!("{:016x}", hash)
    }

    pub fn size_bytes(&self) -> usize {
        self.content.len()
    }
}

// ── Compiler ─────────────────────────────────────────────────────────

/// Compiles process models into state machines
#[derive(Clone, Debug, Default)]
pub struct ProcessCompiler {
    config: CompilerConfig,
}

impl ProcessCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Lower a model into its transition table
    pub fn compile(&self, model: &ProcessModel) -> CodegenResult<CompiledProcess> {
        model.validate()?;
        let ctx = EmissionContext::new(model, &self.config)?;

        let fields = fields::emit(&ctx);
        let conditions = conditions::emit(&ctx);
        let start = start::emit(&ctx)?;

        let mut transitions = Vec::new();
        for emission in ctx.plan() {
            match emission {
                Emission::Step(hc) => transitions.extend(step::emit(&ctx, hc)),
                Emission::Approval(gate, continuation) => {
                    transitions.extend(approval::emit(&ctx, gate, continuation))
                }
                Emission::FailureHandler(handler) => {
                    transitions.push(failure::emit_trigger(handler)?)
                }
            }
        }

        // Handler names are snake-cased, so distinct messages can still collide.
        let mut handlers: HashMap<&str, &str> = HashMap::new();
        for transition in &transitions {
            if let Some(first) = handlers.insert(&transition.name, &transition.trigger) {
                return Err(CodegenError::DuplicateIdentifier {
                    name: transition.name.clone(),
                    first: format!("message '{}'", first),
                    second: format!("message '{}'", transition.trigger),
                });
            }
        }

        let forks = model.forks.iter().map(|f| fork::layout(&ctx, f)).collect();
        let not_found = not_found::emit(ctx.messages());

        let compiled = CompiledProcess {
            process: model.name.clone(),
            state_type: ctx.state_type(),
            phases: ctx.phases().to_vec(),
            fields,
            conditions,
            messages: ctx.messages().to_vec(),
            forks,
            start,
            transitions,
            not_found,
        };

        tracing::info!(
            process = %compiled.process,
            phases = compiled.phases.len(),
            messages = compiled.messages.len(),
            transitions = compiled.transitions.len(),
            "Compiled process"
        );
        Ok(compiled)
    }

    /// Compile a model and render it as Rust source
    pub fn compile_to_source(&self, model: &ProcessModel) -> CodegenResult<GeneratedSource> {
        let compiled = self.compile(model)?;
        let content = render::render(&compiled, &self.config);
        let source = GeneratedSource::new(&compiled.process, content);
        tracing::debug!(
            process = %source.process,
            bytes = source.size_bytes(),
            hash = %source.content_hash,
            "Rendered process source"
        );
        Ok(source)
    }
}
