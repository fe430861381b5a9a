//! Scripted gateway shared by the handler tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::ports::{GatewayError, GenerationContext, GenerationKind, ModelGateway};

/// Replays queued results in order; an empty queue fails every call.
#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Result<String, GatewayError>>>,
    calls: Mutex<Vec<(GenerationKind, GenerationContext)>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_ok(self, text: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    pub fn then_err(self, err: GatewayError) -> Self {
        self.script.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<(GenerationKind, GenerationContext)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<GenerationKind> {
        self.calls().into_iter().map(|(kind, _)| kind).collect()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn generate(
        &self,
        kind: GenerationKind,
        context: &GenerationContext,
    ) -> Result<String, GatewayError> {
        self.calls.lock().unwrap().push((kind, context.clone()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Provider("script exhausted".into())))
    }
}
