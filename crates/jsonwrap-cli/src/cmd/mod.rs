use anyhow::Result;

use crate::args::{Cli, Command};

mod annotate;
mod classes;
mod fake;
mod hydrate;
mod skeleton;

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Hydrate { input, class, explain } => hydrate::run(&cli.classes, &input, &class, explain),
        Command::Annotate { class } => annotate::run(&cli.classes, &class),
        Command::Skeleton { input, class } => skeleton::run(&cli.classes, &input, &class),
        Command::Fake { class, depth, items, all_fields } => fake::run(&cli.classes, &class, depth, items, all_fields),
        Command::Classes => classes::run(&cli.classes),
    }
}
