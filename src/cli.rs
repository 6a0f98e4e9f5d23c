use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "canopy", version)]
#[command(
    about = "Build static websites from Markdown content and layouts",
    long_about = "canopy turns a tree of Markdown files with YAML front matter into a static site: \n\
pages, section and tag indexes, an RSS feed, a sitemap and a search index. \n\
Run the commands from anywhere inside a project containing canopy.yaml."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn build() -> Self {
        <Self as Parser>::parse()
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    #[command(
        about = "Render the site into the output directory",
        long_about = "Discover content/, render every page with the layouts in templates/ and write the\n\
result to the output directory. The build is staged next to the output and only replaces\n\
it when every step succeeded, so a failed build leaves the previous site untouched."
    )]
    Build(BuildArgs),
    #[command(
        about = "Query the search index of the last build",
        long_about = "Load the search index written by the last build and print the best matches for a\n\
query, ranked exactly as the in-page search overlay ranks them."
    )]
    Search(SearchArgs),
    #[command(
        about = "Remove the output directory",
        long_about = "Delete the rendered output directory configured by output_dir in canopy.yaml.",
        alias = "clear"
    )]
    Clean(CleanArgs),
}

#[derive(Args, Clone, Debug)]
pub struct BuildArgs {
    #[arg(
        long,
        help = "Project root directory (defaults to the nearest directory with canopy.yaml)",
        long_help = "Start looking for canopy.yaml here instead of the current working directory. The search walks upward until the file is found."
    )]
    pub root: Option<String>,
    #[arg(
        long,
        help = "Include pages marked draft: true",
        long_help = "Render drafts as regular pages. Drafts are still left out of the search index."
    )]
    pub drafts: bool,
    #[arg(
        long,
        help = "Write the site here instead of output_dir",
        long_help = "Override output_dir from canopy.yaml. Relative paths resolve against the current working directory."
    )]
    pub output: Option<String>,
    #[arg(
        short,
        long,
        help = "Print progress information while building",
        long_help = "Show every pipeline step and each rendered page, listing and redirect."
    )]
    pub verbose: bool,
}

#[derive(Args, Clone, Debug)]
pub struct SearchArgs {
    #[arg(help = "Text to search for")]
    pub query: String,
    #[arg(
        long,
        help = "Project root directory (defaults to the nearest directory with canopy.yaml)"
    )]
    pub root: Option<String>,
    #[arg(
        long,
        help = "Read the index from this output directory instead of output_dir"
    )]
    pub output: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct CleanArgs {
    #[arg(
        long,
        help = "Project root directory (defaults to the nearest directory with canopy.yaml)"
    )]
    pub root: Option<String>,
}
