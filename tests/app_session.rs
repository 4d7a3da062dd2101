//! Session wiring from the application config

use spikekit::{args, load_config, session_from_config, Callback, Config, Signature, CONFIG_ENV};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_config_prefix_applies_to_session() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("spikekit.toml");
    std::fs::write(
        &path,
        "[session]\nhandler_prefix = \"handle_\"\n\n[logging]\nlevel = \"warn\"\n",
    )
    .unwrap();

    std::env::set_var(CONFIG_ENV, &path);
    let config = load_config().unwrap();
    std::env::remove_var(CONFIG_ENV);

    assert_eq!(config.logging.level, "warn");

    let session = session_from_config(&config);
    let counter = Arc::new(AtomicUsize::new(0));

    let c = counter.clone();
    let handler = Callback::new("handle_merge", Signature::new(), move |_, _| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    session.connect(handler).unwrap();

    // The default prefix no longer matches.
    let misnamed = Callback::new("on_merge", Signature::new(), |_, _| Ok(()));
    assert!(session.connect(misnamed).unwrap_err().is_naming_error());

    session.emit("merge", args![]).unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_default_config_session() {
    let session = session_from_config(&Config::default());
    assert_eq!(session.config().handler_prefix, "on_");
    assert!(session.config().allow_action_override);
}
