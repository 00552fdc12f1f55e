use crate::client::{ApiClient, odata_quote};
use crate::error::Error;
use crate::models::ServiceRecord;

impl ApiClient {
    /// List the services of a fleet, addressed by the fleet's app name.
    pub async fn list_services(&self, app_name: &str) -> Result<Vec<ServiceRecord>, Error> {
        self.list_filtered(
            "service",
            &format!("application/app_name eq {}", odata_quote(app_name)),
        )
        .await
    }
}
