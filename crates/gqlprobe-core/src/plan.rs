//! Probe plan: the ordered probes for an endpoint and when each may run.

use serde::{Deserialize, Serialize};

use crate::endpoint::{Endpoint, TransportKind};
use crate::probe::ProbeKind;

/// Short-circuit predicate attached to a step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepGate {
    /// Run regardless of earlier findings.
    Always,

    /// Run only while nothing has been found yet. Used for probes whose
    /// failure would just repeat an earlier root cause.
    OnlyIfNoProblem,
}

impl StepGate {
    /// Whether a step with this gate may run, given the findings so far.
    pub fn permits(&self, has_problem: bool) -> bool {
        match self {
            StepGate::Always => true,
            StepGate::OnlyIfNoProblem => !has_problem,
        }
    }

    /// Why a step was skipped, for logs.
    pub fn skip_reason(&self) -> &'static str {
        match self {
            StepGate::Always => "never skipped",
            StepGate::OnlyIfNoProblem => "an earlier probe already found a problem",
        }
    }
}

/// One entry in a probe plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProbeStep {
    pub probe: ProbeKind,
    pub gate: StepGate,
}

impl ProbeStep {
    pub fn always(probe: ProbeKind) -> Self {
        Self {
            probe,
            gate: StepGate::Always,
        }
    }

    pub fn only_if_no_problem(probe: ProbeKind) -> Self {
        Self {
            probe,
            gate: StepGate::OnlyIfNoProblem,
        }
    }
}

/// Ordered probes for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbePlan {
    steps: Vec<ProbeStep>,
}

impl ProbePlan {
    /// Build the plan for an endpoint's transport.
    ///
    /// WebSocket endpoints get a single connection probe; introspection and
    /// CORS have no meaning there. HTTP endpoints get preflight, ping, then
    /// introspection gated on nothing having been found.
    pub fn for_endpoint(endpoint: &Endpoint) -> Self {
        let steps = match endpoint.transport_kind() {
            TransportKind::WebSocket => vec![ProbeStep::always(ProbeKind::WebSocketConnect)],
            TransportKind::Http => vec![
                ProbeStep::always(ProbeKind::Preflight),
                ProbeStep::always(ProbeKind::Ping),
                ProbeStep::only_if_no_problem(ProbeKind::Introspection),
            ],
        };
        Self { steps }
    }

    pub fn steps(&self) -> &[ProbeStep] {
        &self.steps
    }

    pub fn probes(&self) -> Vec<ProbeKind> {
        self.steps.iter().map(|s| s.probe).collect()
    }
}
