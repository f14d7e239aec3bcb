use clap::{Args, Parser, Subcommand};
use redecor::{
    logger::{self, LogLevel, LoggerConfig},
    render, Config, Decorator, DesignMode, GenerationRequest, SourceImage, Style,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "redecor",
    version,
    about = "AI interior decorator: generate a new look for a room and shop the items in it"
)]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also append logs to this file
    #[arg(long, global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available design styles
    Styles,
    /// Generate a room design and extract shoppable items from it
    Generate(GenerateArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Design style, by name or slug (see `redecor styles`)
    #[arg(short, long)]
    style: Style,

    /// Custom requests, e.g. "Make the sofa dark blue, add a large rug"
    #[arg(short, long, default_value = "")]
    notes: String,

    /// Room photo to redesign (jpg, jpeg or png)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// `redesign` needs --image, `scratch` does not
    #[arg(short, long, default_value = "redesign")]
    mode: DesignMode,

    /// Where the generated design is saved
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Override the image generation model
    #[arg(long)]
    image_model: Option<String>,

    /// Override the vision model used for product extraction
    #[arg(long)]
    vision_model: Option<String>,

    /// Print the outcome as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let mut log_config = LoggerConfig::new().with_level(level);
    if let Some(path) = &cli.log_file {
        log_config = log_config.with_file_output(path);
    }
    logger::init_with_config(log_config)?;

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    if dotenv_loaded {
        log::debug!(".env file loaded");
    } else {
        log::debug!("No .env file found, using system environment variables");
    }

    match cli.command {
        Command::Styles => {
            println!("{}", render::style_list());
            Ok(())
        }
        Command::Generate(args) => generate(args).await,
    }
}

async fn generate(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::from_env();
    if let Some(dir) = args.output_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(model) = args.image_model {
        config = config.with_image_model(model);
    }
    if let Some(model) = args.vision_model {
        config = config.with_vision_model(model);
    }
    logger::log_config_info(&config);

    let decorator = Decorator::from_config(config)?;

    if !args.json {
        println!("{}", render::banner());
    }
    if !decorator.is_configured() {
        eprintln!("{}", render::missing_key_warning());
    }

    let mut request = GenerationRequest::new(args.style, args.notes).with_mode(args.mode);
    if let Some(path) = &args.image {
        request = request.with_source_image(SourceImage::from_path(path)?);
    }

    let show_progress = !args.json;
    let outcome = decorator
        .run_with_progress(request, |stage| {
            if show_progress {
                println!("{}", stage.busy_message());
            }
        })
        .await?;

    let saved_to = match &outcome.generated {
        Some(image) => {
            let dir = &decorator.config().output_dir;
            std::fs::create_dir_all(dir)?;
            let path = dir.join(render::output_file_name(
                outcome.style,
                image,
                outcome.started_at,
            ));
            image.save(&path)?;
            log::info!("💾 Design saved to {}", path.display());
            Some(path)
        }
        None => None,
    };

    if args.json {
        let mut summary = outcome.summary();
        if let Some(generated) = summary.generated_image.as_mut() {
            generated.path = saved_to.clone();
        }
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render::outcome_report(&outcome, saved_to.as_deref()));
    }

    Ok(())
}
