mod platform;
mod scripts;

fn main() -> anyhow::Result<()> {
    platform::run_app()
}
