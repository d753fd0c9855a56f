use crate::calibration::{CalibrationProfile, ReferencePoint};
use crate::config::AppConfig;
use crate::region::RegionTable;
use crate::telemetry::tracing_log_path;
use crate::{crash_log_path, log_file_path};
use std::{env, fmt::Display, fs};

pub struct DoctorReport {
    lines: Vec<String>,
}

impl DoctorReport {
    pub fn new(title: &str) -> Self {
        Self {
            lines: vec![title.to_string()],
        }
    }

    pub fn section(&mut self, title: &str) {
        self.lines.push(String::new());
        self.lines.push(format!("{title}:"));
    }

    pub fn push_kv(&mut self, key: &str, value: impl Display) {
        self.lines.push(format!("  {key}: {value}"));
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

/// Shared diagnostics; each binary appends its own section.
pub fn base_doctor_report(config: &AppConfig, binary_name: &str) -> DoctorReport {
    let mut report = DoctorReport::new("gazekey doctor");
    report.push_kv("version", env!("CARGO_PKG_VERSION"));
    report.push_kv("binary", binary_name);
    report.push_kv(
        "os",
        format!("{}/{}", env::consts::OS, env::consts::ARCH),
    );

    let mut validated = config.clone();
    let validation_result = validated.validate();
    let resolved = validation_result
        .as_ref()
        .map(|_| &validated)
        .unwrap_or(config);

    report.section("Config");
    match &validation_result {
        Ok(()) => report.push_kv("validation", "ok"),
        Err(err) => report.push_kv("validation", format!("error: {err:#}")),
    }
    report.push_kv("port", resolved.port);
    report.push_kv("threshold", resolved.threshold);
    report.push_kv(
        "logs",
        if resolved.logging_enabled() {
            "enabled"
        } else {
            "disabled"
        },
    );
    report.push_kv(
        "log_content",
        if resolved.log_content {
            "enabled"
        } else {
            "disabled"
        },
    );
    report.push_kv("log_file", log_file_path().display());
    report.push_kv("crash_log", crash_log_path().display());
    report.push_kv("trace_log", tracing_log_path().display());

    report.section("Geometry");
    match resolved.region_table() {
        Ok(table) => describe_geometry(&mut report, &table),
        Err(err) => report.push_kv("regions", format!("error: {err:#}")),
    }

    report.section("Layout");
    report.push_kv(
        "source",
        resolved
            .layout
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "standard".to_string()),
    );
    match resolved.panel_layout() {
        Ok(layout) => match layout.validate() {
            Ok(()) => report.push_kv("validation", "ok"),
            Err(err) => report.push_kv("validation", format!("error: {err}")),
        },
        Err(err) => report.push_kv("validation", format!("error: {err:#}")),
    }

    report.section("Calibration");
    describe_calibration(&mut report, resolved);

    report
}

fn describe_geometry(report: &mut DoctorReport, table: &RegionTable) {
    report.push_kv("version", RegionTable::VERSION);
    report.push_kv("inner_radius", table.inner_radius());
    report.push_kv("outer_radius", table.outer_radius());
    report.push_kv("sectors", table.sectors().len());
    match table.check_partition() {
        Ok(()) => report.push_kv("partition", "ok"),
        Err(err) => report.push_kv("partition", format!("error: {err}")),
    }
}

fn describe_calibration(report: &mut DoctorReport, config: &AppConfig) {
    let path = &config.calibration_file;
    report.push_kv("file", path.display());
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            report.push_kv("status", "missing (run gaze_sender --calibrate)");
            return;
        }
        Err(err) => {
            report.push_kv("status", format!("unreadable: {err}"));
            return;
        }
    };
    match CalibrationProfile::from_json(&text) {
        Ok(profile) => {
            report.push_kv("status", "ok");
            for reference in ReferencePoint::CAPTURE_ORDER {
                let point = profile.point(reference);
                report.push_kv(
                    reference.label(),
                    format!("({:.3}, {:.3})", point.x, point.y),
                );
            }
        }
        Err(err) => report.push_kv("status", format!("invalid: {err}")),
    }
}
