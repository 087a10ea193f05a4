mod command;
mod high_score;
mod schema;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
