use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::PathBuf;
use crate::cli::Args;
use crate::config::RunSettings;
use crate::error::{Result, WlmError};
use crate::fetch::Fetcher;
use crate::measurement::{Measurement, SiteRole};
use crate::notify::Notifier;
use crate::output::Logger;
use crate::policy::{NotificationDecision, NotificationPolicy};
use crate::ranking::RankedSet;
use crate::report::{Report, ResultFile};
use crate::validate::{ValidationKind, Validator};

/// What one invocation should measure and whom to tell about it.
#[derive(Debug, Clone)]
pub struct MeasureRequest {
    pub benchmark: String,
    pub competitors: Vec<String>,
    pub mail: Option<String>,
    pub phone_number: Option<String>,
}

impl MeasureRequest {
    pub fn from_args(args: &Args) -> Result<Self> {
        let benchmark = args
            .url
            .clone()
            .ok_or_else(|| WlmError::missing_config("--url is required".to_string()))?;
        if args.list.is_empty() {
            return Err(WlmError::missing_config("--list needs at least one URL".to_string()));
        }
        Ok(Self {
            benchmark,
            competitors: args.list.clone(),
            mail: args.mail.clone(),
            phone_number: args.phone_number.clone(),
        })
    }
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub ranked: RankedSet,
    pub decision: NotificationDecision,
    pub report: Report,
    pub result_file: PathBuf,
    /// `(channel, recipient)` for every notification that went out.
    pub sent: Vec<(&'static str, String)>,
    /// Notification failures; logged, never fatal.
    pub notification_errors: Vec<WlmError>,
}

/// Runs fetch, rank, decide, notify, report for one invocation.
pub struct WebsiteMeasure<'a> {
    validator: Validator,
    fetcher: &'a dyn Fetcher,
    mailer: &'a dyn Notifier,
    sms: &'a dyn Notifier,
    policy: NotificationPolicy,
    output_dir: PathBuf,
    logger: &'a Logger,
}

impl<'a> WebsiteMeasure<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        mailer: &'a dyn Notifier,
        sms: &'a dyn Notifier,
        settings: &RunSettings,
        logger: &'a Logger,
    ) -> Result<Self> {
        Ok(Self {
            validator: Validator::new()?,
            fetcher,
            mailer,
            sms,
            policy: NotificationPolicy::new(settings.sms_factor),
            output_dir: settings.output_dir.clone(),
            logger,
        })
    }

    pub fn run(&self, request: &MeasureRequest) -> Result<RunOutcome> {
        self.logger.run_started(&request.benchmark, request.competitors.len());

        if let Some(mail) = &request.mail {
            self.validator.is_valid(ValidationKind::Mail, mail)?;
        }
        if let Some(phone_number) = &request.phone_number {
            self.validator.is_valid(ValidationKind::PhoneNumber, phone_number)?;
        }

        let result_file = ResultFile::create(&self.output_dir, self.logger)?;

        let ranked = self.compare_websites(request)?;
        let decision = self.policy.decide(&ranked);
        let (sent, notification_errors) = self.send_notifications(&ranked, &decision, request);

        let report = Report::new(&ranked, Local::now());
        for line in report.lines() {
            println!("{}", line);
        }
        result_file.write_report(&report)?;

        Ok(RunOutcome {
            ranked,
            decision,
            report,
            result_file: result_file.path().to_path_buf(),
            sent,
            notification_errors,
        })
    }

    /// Measures the benchmark, then every competitor in order. The first failure ends the run.
    pub fn compare_websites(&self, request: &MeasureRequest) -> Result<RankedSet> {
        let progress = self.progress_bar(1 + request.competitors.len());

        let benchmark = self.measure_load_time(&request.benchmark, SiteRole::Benchmark, &progress);
        let benchmark = match benchmark {
            Ok(m) => m,
            Err(err) => {
                progress.abandon();
                return Err(err);
            }
        };

        let mut competitors = Vec::with_capacity(request.competitors.len());
        for url in &request.competitors {
            match self.measure_load_time(url, SiteRole::Competitor, &progress) {
                Ok(m) => competitors.push(m),
                Err(err) => {
                    progress.abandon();
                    return Err(err);
                }
            }
        }
        progress.finish_and_clear();

        Ok(RankedSet::from_run(benchmark, competitors))
    }

    fn measure_load_time(&self, url: &str, role: SiteRole, progress: &ProgressBar) -> Result<Measurement> {
        progress.set_message(url.to_string());
        self.validator.is_valid(ValidationKind::Url, url)?;

        self.logger.fetch_start(url);
        let timing = self.fetcher.fetch(url)?;
        let measurement = Measurement::with_role(url, role, timing.start, timing.end);
        self.logger.fetch_complete(url, measurement.duration().as_secs_f64());

        progress.inc(1);
        Ok(measurement)
    }

    fn send_notifications(
        &self,
        ranked: &RankedSet,
        decision: &NotificationDecision,
        request: &MeasureRequest,
    ) -> (Vec<(&'static str, String)>, Vec<WlmError>) {
        let mut sent = Vec::new();
        let mut errors = Vec::new();
        let place = ranked.benchmark_rank();
        let total = ranked.len();

        let mut deliver = |notifier: &dyn Notifier, recipient: Option<&str>| {
            match notifier.send(place, total, recipient) {
                Ok(recipient) => {
                    self.logger.notification_sent(notifier.channel(), &recipient);
                    sent.push((notifier.channel(), recipient));
                }
                Err(err) => {
                    self.logger.error_from_wlm_error(&err);
                    errors.push(err);
                }
            }
        };

        if decision.email {
            deliver(self.mailer, request.mail.as_deref());
        }
        if decision.sms {
            let mut context = HashMap::new();
            context.insert("competitor".to_string(), decision.sms_trigger.clone().unwrap_or_default());
            context.insert("factor".to_string(), self.policy.sms_factor().to_string());
            self.logger.verbose_with_context("SMS escalation triggered", context);
            deliver(self.sms, request.phone_number.as_deref());
        }

        (sent, errors)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if self.logger.quiet {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("=> "));
        }
        pb
    }
}
