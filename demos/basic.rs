//! Basic example demonstrating the Signals Notebook client.
//!
//! Run with:
//! ```
//! SIGNALS_NOTEBOOK_API_KEY=your-key \
//! SIGNALS_NOTEBOOK_API_URL=https://tenant.signalsnotebook.com/api/rest/v1.0 \
//!     cargo run --example basic
//! ```

use futures::TryStreamExt;
use signals_notebook::{
    Container, Entity, EntityListQuery, EntityType, Experiment, Get, Library, List, Profile,
    SignalsClient,
};

#[tokio::main]
async fn main() -> signals_notebook::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    println!("Creating Signals Notebook client...");
    let client = SignalsClient::from_env()?;
    println!("Connected to: {}", client.base_url());

    let profile = Profile::get_current(&client).await?;
    println!("Signed in as {} {} ({})", profile.first_name, profile.last_name, profile.tenant);

    // Collect every page of experiments
    println!("\n--- Experiments ---");
    let query = EntityListQuery::default().include_types([EntityType::Experiment]);
    let experiments = Entity::list_all(&client, &query).await?;
    println!("Found {} experiments", experiments.len());

    for entity in experiments.iter().take(5) {
        println!("  - {} ({})", entity.name(), entity.eid());
    }

    if let Some(first) = experiments.first() {
        println!("\n--- Experiment Children ---");
        let experiment = Experiment::get(&client, first.eid().clone()).await?;
        let mut children = experiment.get_children(&client);
        while let Some(child) = children.try_next().await? {
            println!("  {:<18} {}", child.entity_type().to_string(), child.name());
        }
    }

    println!("\n--- Material Libraries ---");
    let libraries = Library::list_all(&client, &()).await?;
    for library in &libraries {
        println!("  - {}", library.name());
    }

    Ok(())
}
