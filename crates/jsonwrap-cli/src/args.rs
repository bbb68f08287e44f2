use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "jsonwrap", version, about = "Hydrate JSON into schema-declared classes")]
pub struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Class manifest: `{"classes": [...], "config": {...}}`.
    #[arg(long, global = true, default_value = "classes.json")]
    pub classes: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Hydrate a JSON document as an instance of a class.
    Hydrate {
        /// Input path, or `-` for stdin.
        input: String,

        #[arg(long)]
        class: String,

        /// Also list every class node of the result with its path.
        #[arg(long)]
        explain: bool,
    },

    /// Print the annotated schema of a class.
    Annotate {
        #[arg(long)]
        class: String,
    },

    /// Print the skeleton a document would be merged into.
    Skeleton {
        /// Input path, or `-` for stdin.
        input: String,

        #[arg(long)]
        class: String,
    },

    /// Generate a fixture document from a class schema.
    Fake {
        #[arg(long)]
        class: String,

        /// How many levels of `$ref` to expand.
        #[arg(long, default_value_t = 2)]
        depth: usize,

        /// Elements generated per array.
        #[arg(long, default_value_t = 1)]
        items: usize,

        /// Include optional properties, not only required ones.
        #[arg(long)]
        all_fields: bool,
    },

    /// List declared classes and their references.
    Classes,
}
