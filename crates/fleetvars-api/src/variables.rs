// Environment variable collections.
//
// Fleet, service, and device variables share one wire shape and differ only
// in the collection name and the field that points at the parent.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::VariableRecord;

/// Which `*_environment_variable` collection a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableCollection {
    Fleet,
    Service,
    Device,
}

impl VariableCollection {
    /// Collection path under `/v7/`.
    pub fn resource(self) -> &'static str {
        match self {
            Self::Fleet => "application_environment_variable",
            Self::Service => "service_environment_variable",
            Self::Device => "device_environment_variable",
        }
    }

    /// Navigation field naming the parent entity.
    pub fn parent_field(self) -> &'static str {
        match self {
            Self::Fleet => "application",
            Self::Service => "service",
            Self::Device => "device",
        }
    }

    fn filter(self, parent_id: u64) -> String {
        format!("{} eq {parent_id}", self.parent_field())
    }

    fn entity(self, variable_id: u64) -> String {
        format!("{}({variable_id})", self.resource())
    }
}

impl ApiClient {
    /// List every variable under one parent, in server order.
    pub async fn list_variables(
        &self,
        collection: VariableCollection,
        parent_id: u64,
    ) -> Result<Vec<VariableRecord>, Error> {
        self.list_filtered(collection.resource(), &collection.filter(parent_id))
            .await
    }

    pub async fn create_variable(
        &self,
        collection: VariableCollection,
        parent_id: u64,
        name: &str,
        value: &str,
    ) -> Result<(), Error> {
        let mut body = Map::new();
        body.insert(collection.parent_field().into(), Value::from(parent_id));
        body.insert("name".into(), Value::from(name));
        body.insert("value".into(), Value::from(value));

        self.post_no_response(collection.resource(), &body).await
    }

    /// Update a variable's value, addressed by its remote id.
    pub async fn update_variable(
        &self,
        collection: VariableCollection,
        variable_id: u64,
        value: &str,
    ) -> Result<(), Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            value: &'a str,
        }

        self.patch_no_response(&collection.entity(variable_id), &Body { value })
            .await
    }

    pub async fn delete_variable(
        &self,
        collection: VariableCollection,
        variable_id: u64,
    ) -> Result<(), Error> {
        self.delete(&collection.entity(variable_id)).await
    }
}
