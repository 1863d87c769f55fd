use std::fmt;

/// One external command in the upgrade sequence, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Login,
    SetSubscription,
    FetchCredentials,
    InitClient,
    UpdateDependencies,
    Upgrade,
    ListPods,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Login => "login",
            Step::SetSubscription => "set-subscription",
            Step::FetchCredentials => "fetch-credentials",
            Step::InitClient => "init-client",
            Step::UpdateDependencies => "update-dependencies",
            Step::Upgrade => "upgrade",
            Step::ListPods => "list-pods",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
