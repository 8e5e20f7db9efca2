use clap::Parser;
use std::fs;
use std::process::exit;
use wlm::cli::{Args, LogFormat};
use wlm::config::{Config, RunSettings};
use wlm::error::{Result, WlmError};
use wlm::fetch::HttpFetcher;
use wlm::init::init_config;
use wlm::mail::SmtpMailer;
use wlm::measure::{MeasureRequest, WebsiteMeasure};
use wlm::notify::Notifier;
use wlm::output::{daily_log_file_name, Logger};
use wlm::sms::{DummySmsSender, TwilioSmsSender};

fn main() {
    let mut args = Args::parse();

    if args.init {
        let logger = Logger::new(args.quiet, args.verbose);
        if let Err(err) = init_config(&logger) {
            fail(&logger, &err);
        }
        return;
    }

    let (config, settings) = match load_settings(&mut args) {
        Ok(loaded) => loaded,
        Err(err) => fail(&Logger::new(args.quiet, args.verbose), &err),
    };

    let logger = build_logger(&args, &settings);
    if let Err(err) = measure(&args, &config, &settings, &logger) {
        fail(&logger, &err);
    }
}

fn load_settings(args: &mut Args) -> Result<(Config, RunSettings)> {
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_env()?;
    config.merge_with_args(args);
    let settings = RunSettings::resolve(args, &config)?;
    Ok((config, settings))
}

fn build_logger(args: &Args, settings: &RunSettings) -> Logger {
    let json = matches!(args.log_format, Some(LogFormat::Json));
    let mut logger = Logger::new_with_json(args.quiet, args.verbose, json);
    if let Some(level) = args.log_level {
        logger = logger.with_min_level(level.into());
    }
    // Without the directory the daily log is skipped; the result file reports the real error.
    if fs::create_dir_all(&settings.output_dir).is_ok() {
        logger = logger.with_log_file(settings.output_dir.join(daily_log_file_name()));
    }
    logger
}

fn measure(args: &Args, config: &Config, settings: &RunSettings, logger: &Logger) -> Result<()> {
    let request = MeasureRequest::from_args(args)?;
    let fetcher = HttpFetcher::new(settings.timeout)?;
    let mailer = SmtpMailer::new(config.mail.clone().unwrap_or_default(), settings.timeout, logger);

    let sms_config = config.sms.clone().unwrap_or_default();
    let twilio = if args.dummy_sms {
        None
    } else {
        TwilioSmsSender::from_config(&sms_config, settings.timeout, logger)?
    };
    let sms: Box<dyn Notifier + '_> = match twilio {
        Some(sender) => Box::new(sender),
        None => {
            logger.verbose("No SMS credentials configured, SMS messages will be printed");
            Box::new(DummySmsSender::new(sms_config.default_recipient.clone(), logger))
        }
    };

    let app = WebsiteMeasure::new(&fetcher, &mailer, sms.as_ref(), settings, logger)?;
    let outcome = app.run(&request)?;
    logger.verbose(&format!("Result saved to {}", outcome.result_file.display()));
    Ok(())
}

fn fail(logger: &Logger, err: &WlmError) -> ! {
    logger.error_from_wlm_error(err);
    exit(1);
}
