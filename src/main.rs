use std::fmt;

use anyhow::Result;
use clap::Parser;
use recordset::{Constraint, RecordId, RecordSet, SetResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as log_fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "recordset")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Look people up in the sample record set", long_about = None)]
struct Cli {
    /// Id of the person to find
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    id: RecordId,

    /// Also list every person with this name
    #[arg(long, env = "RECORDSET_NAME")]
    name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct Person {
    name: String,
    age: u32,
}

impl Person {
    fn new(name: &str, age: u32) -> Self {
        Self {
            name: name.to_owned(),
            age,
        }
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} years old", self.name, self.age)
    }
}

fn sample_people() -> SetResult<RecordSet<Person>> {
    Ok(RecordSet::builder()
        .constraint(Constraint::check(|person: &Person| !person.name.is_empty()))?
        .insert_with_id(1, Person::new("João", 25))?
        .insert_with_id(2, Person::new("Maria", 30))?
        .insert_with_id(3, Person::new("Pedro", 22))?
        .build())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_fmt::layer().with_target(false))
        .try_init()
        .ok();

    let people = sample_people()?;

    match people.find_by_id(cli.id) {
        Some(person) => println!("Found person: {}.", person.data),
        None => println!("Person not found."),
    }

    if let Some(name) = cli.name {
        let names = people.create_index("name", |person| person.name.clone())?;
        for person in names.select(&name)? {
            println!("#{}: {}", person.id, person.data);
        }
    }

    Ok(())
}
