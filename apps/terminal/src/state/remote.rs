//! # Remote State
//!
//! The classifier and sink chosen at startup, shared by the commands that
//! reach outside the process.

use std::fmt;
use std::sync::Arc;

use duka_remote::{
    classifier_from_settings, sink_from_settings, IntentClassifier, PersistenceSink,
    RemoteConfig, RemoteResult,
};

#[derive(Clone)]
pub struct RemoteState {
    classifier: Arc<dyn IntentClassifier>,
    sink: Arc<dyn PersistenceSink>,
}

impl RemoteState {
    pub fn new(classifier: Arc<dyn IntentClassifier>, sink: Arc<dyn PersistenceSink>) -> Self {
        RemoteState { classifier, sink }
    }

    /// Builds both collaborators from loaded configuration.
    pub fn from_config(config: &RemoteConfig) -> RemoteResult<Self> {
        Ok(RemoteState {
            classifier: classifier_from_settings(&config.classifier)?,
            sink: sink_from_settings(&config.sink)?,
        })
    }

    pub fn classifier(&self) -> &dyn IntentClassifier {
        self.classifier.as_ref()
    }

    /// Owned handle, for moving into a spawned task.
    pub fn sink(&self) -> Arc<dyn PersistenceSink> {
        Arc::clone(&self.sink)
    }
}

impl fmt::Debug for RemoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteState")
            .field("classifier", &self.classifier.name())
            .field("sink_enabled", &self.sink.is_enabled())
            .finish()
    }
}
