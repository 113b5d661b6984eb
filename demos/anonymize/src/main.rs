use anonymize::AnonymizeApp;

fn main() -> anyhow::Result<()> {
    turbine_cli::start(AnonymizeApp)
}
