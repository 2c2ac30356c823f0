use crate::error::TransportError;
use crate::permit::Permit;
use crate::query::PermitQuery;
use async_trait::async_trait;

/// Backing dataset the engine searches.
#[async_trait]
pub trait PermitSource: Send + Sync {
    async fn query(&self, query: &PermitQuery) -> Result<Vec<Permit>, TransportError>;

    /// Whether the client already knows it has no connectivity. Searches check
    /// this first and skip the request entirely when it is true.
    fn is_offline(&self) -> bool {
        false
    }
}
