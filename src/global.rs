//! Process-wide accessor for the configuration client.
//!
//! Library code should take an `Arc<Client>` explicitly. This accessor is for
//! the outermost layer of a binary, where threading a handle through is not
//! practical.

use std::sync::{Arc, OnceLock};

use crate::client::{Client, SiteConfiguration};

static CLIENT: OnceLock<Arc<Client>> = OnceLock::new();

/// Install the process-wide client. Fails if one is already installed.
pub fn install(client: Arc<Client>) -> Result<(), Arc<Client>> {
    CLIENT.set(client)
}

pub fn client() -> Option<&'static Arc<Client>> {
    CLIENT.get()
}

/// See [`Client::get`]. `None` until a client is installed.
pub fn get() -> Option<SiteConfiguration> {
    CLIENT.get().map(|client| client.get())
}

/// See [`Client::get_todo`]. `None` until a client is installed.
pub fn get_todo() -> Option<SiteConfiguration> {
    CLIENT.get().map(|client| client.get_todo())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{Fetcher, FixedFetcher};

    #[test]
    fn test_install_once() {
        let fixed = FixedFetcher::new("{}", "{}");
        let client = Arc::new(Client::new(
            Fetcher::from(fixed.clone()),
            Fetcher::from(fixed),
        ));
        client.basic_store().maybe_update(r#"{"disableTelemetry": true}"#).unwrap();

        install(client.clone()).unwrap();
        assert!(install(client).is_err());
        assert!(get().unwrap().basic.disable_telemetry);
        assert!(get_todo().unwrap().basic.disable_telemetry);
        assert!(super::client().is_some());
    }
}
