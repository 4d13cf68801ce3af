pub mod debug;
pub mod cli;
pub mod error;
pub mod geometry;
mod interpreter;
pub mod parser;
pub mod ppm;
pub mod raster;
pub mod scene;

use clap::Parser as ClapParser;
use log::info;
use miette::Result;

use cli::Cli;
use debug::Logger;
use interpreter::Interpreter;
use ppm::output_ppm;
use scene::PrettyPrintable;

fn main() -> Result<()> {
    let cli = Cli::parse();
    Logger::init(cli.debug);

    let result = run(&cli);

    if cli.plain
        && let Err(err) = &result
    {
        eprintln!("{err}");
        std::process::exit(1);
    }

    result
}

fn run(cli: &Cli) -> Result<()> {
    let source = cli.source()?;
    let interpreter = Interpreter::new(&cli.render_config);

    let scene = interpreter.parse_file(source)?;

    if cli.debug {
        println!("{}", scene.pretty_print());
    }

    if cli.stats || cli.check {
        println!("{}", scene.stats());
    }

    if cli.check {
        return Ok(());
    }

    let image = interpreter.render(&scene);
    let output = cli.output();
    timed!(output_ppm(&image, &output))?;

    info!("wrote {}x{} image to {}", image.width, image.height, output.display());
    Ok(())
}
