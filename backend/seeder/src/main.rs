use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Base URL of a running dashboard server
    #[arg(long, default_value = "http://localhost:1111")]
    url: String,

    /// Generated interns to add after the fixed demo roster
    #[arg(long, default_value_t = 0)]
    count: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    seeder::seed(&args.url, args.count).await
}
