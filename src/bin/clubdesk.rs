use anyhow::Result;
use clubdesk::cli::{actions, actions::Action, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let action = start()?;

    // Handle the action
    match action {
        Action::Run(args) => actions::run::handle(args).await?,
    }

    Ok(())
}
