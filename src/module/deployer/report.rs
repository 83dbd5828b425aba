use crate::domain::ManifestKind;
use crate::library::helpers::error_chain;
use serde::Serialize;
use std::error::Error;
use std::fmt;

/// Progress of a single deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeployState {
    /// Nothing has been submitted yet
    Start,
    /// The configuration payload step has been passed
    ConfigPublished,
    /// The workload has been created
    WorkloadSubmitted,
    /// The network service has been created
    ServiceSubmitted,
    /// The route has been created
    RouteSubmitted,
    /// Every step succeeded
    Done,
    /// At least one step failed
    PartiallyFailed,
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Reaction to a failed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailurePolicy {
    /// Record the failure and continue with the next step
    BestEffort,
    /// Record the failure and skip all remaining steps
    FailFast,
}

impl FailurePolicy {
    /// Policy applied to failures while provisioning the given kind
    ///
    /// A missing configuration payload can be fixed by re-running the deployment, while every
    /// other step produces the name its successor depends on.
    pub fn for_kind(kind: ManifestKind) -> Self {
        match kind {
            ManifestKind::ConfigurationPayload => FailurePolicy::BestEffort,
            _ => FailurePolicy::FailFast,
        }
    }
}

/// Recorded failure of a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    /// Kind of resource which could not be provisioned
    pub kind: ManifestKind,
    /// Policy which has been applied
    pub policy: FailurePolicy,
    /// Rendered error including all causes
    pub message: String,
}

/// Names of all resources provisioned by a deployment alongside any failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployReport {
    /// Namespace the resources live in
    pub namespace: String,
    /// Progress reached
    pub state: DeployState,
    /// Name of the published configuration payload
    pub config_map: Option<String>,
    /// Name of the created workload
    pub workload: Option<String>,
    /// Name of the created network service
    pub service: Option<String>,
    /// Name of the created route
    pub route: Option<String>,
    /// Failures recorded along the way
    pub failures: Vec<StageFailure>,
}

impl DeployReport {
    pub(super) fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            state: DeployState::Start,
            config_map: None,
            workload: None,
            service: None,
            route: None,
            failures: Vec::new(),
        }
    }

    pub(super) fn advance(&mut self, state: DeployState) {
        self.state = state;
    }

    /// Records a failure and returns the policy that has to be applied
    pub(super) fn record(
        &mut self,
        kind: ManifestKind,
        error: &(dyn Error + 'static),
    ) -> FailurePolicy {
        let policy = FailurePolicy::for_kind(kind);

        self.failures.push(StageFailure {
            kind,
            policy,
            message: error_chain(error),
        });

        policy
    }

    pub(super) fn finish(&mut self) {
        self.state = if self.failures.is_empty() {
            DeployState::Done
        } else {
            DeployState::PartiallyFailed
        };
    }

    /// Whether every step succeeded
    pub fn is_complete(&self) -> bool {
        self.state == DeployState::Done
    }
}
