mod platform;
mod registry;
mod users;

use anyhow::bail;
use platform::{run_app, AppSettings, RowCommand};

/// `users_admin [LOCATION] [ACTION USER_ID]`, e.g.
/// `users_admin "/users/disabled?q=ann" enable 42`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (location, command) = match args.as_slice() {
        [] => (None, None),
        [location] => (Some(location.clone()), None),
        [location, action, user_id] => (
            Some(location.clone()),
            Some(RowCommand::parse(action, user_id)?),
        ),
        _ => bail!("usage: users_admin [LOCATION] [enable|disable|delete USER_ID]"),
    };

    run_app(AppSettings::from_env(), location, command).await?;
    Ok(())
}
