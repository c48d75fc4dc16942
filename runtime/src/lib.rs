pub mod middleware;
pub mod policy;

pub mod prelude {
    pub use crate::middleware::LoadingMiddleware;
    pub use crate::policy::{Collapse, Counted, ReentrancyPolicy};
}

pub use middleware::LoadingMiddleware;
pub use policy::{Collapse, Counted, ReentrancyPolicy, policy_for};
