mod app;
mod keymap;

use app::{App, AppOptions};

fn main() -> anyhow::Result<()> {
    let options = parse_args()?;
    let app = App::new(options)?;
    app.run()
}

fn parse_args() -> anyhow::Result<AppOptions> {
    let mut options = AppOptions::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--image" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--image requires a path"))?;
                options.image = Some(path.into());
            }
            "--font" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--font requires a path"))?;
                options.font = Some(path.into());
            }
            other => {
                anyhow::bail!("unknown argument {other:?}; expected --image <path> or --font <path>")
            }
        }
    }

    Ok(options)
}
