use serde_json::Value;
use spikekit::{args, init_logging, load_config, session_from_config, Callback, Signature};

fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_logging(&config.logging)?;
    tracing::info!("SpikeKit {} (built {})", spikekit::VERSION, spikekit::BUILD_DATE);

    let session = session_from_config(&config);
    let prefix = config.session.handler_prefix.clone();

    session.connect(Callback::new(
        format!("{prefix}select"),
        Signature::new().param("cluster_ids").param_or("source", "user"),
        |_, args| {
            let ids: Vec<u32> = args.value("cluster_ids")?;
            tracing::info!("Selected clusters {:?} ({})", ids, args.str("source")?);
            Ok(())
        },
    ))?;

    session.action_with("Select clusters").apply(Callback::new(
        "select",
        Signature::new().param("cluster_ids"),
        |session, args| {
            let ids = args.get("cluster_ids").cloned().unwrap_or(Value::Null);
            Ok(session.emit("select", args![ids; source = "action"])?)
        },
    ))?;

    for action in session.actions() {
        tracing::info!("Action '{}': {}", action.name(), action.title());
    }

    session.call("select", args![vec![3, 5, 8]])?;
    session.emit("select", args![vec![1]; reason = "ignored by the handler"])?;

    Ok(())
}
