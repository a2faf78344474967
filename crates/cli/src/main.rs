use acp::geom::{point, InputPoint, LeftTurn, LineIntersection, LineSegment};
use acp::graph::{DependencyGraph, EscalationStats, SignPredicate};
use acp::param::context;
use acp::{AcpCfg, Parameter, Session};
use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

#[derive(Parser)]
#[command(name = "acp-cli")]
#[command(about = "Certified geometric predicates with adaptive precision")]
struct Cmd {
    /// Relative perturbation applied to literal inputs
    #[arg(long, global = true)]
    delta: Option<f64>,
    /// Seed of the perturbation RNG
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Largest bit width an escalation may reach
    #[arg(long, global = true)]
    max_precision: Option<u32>,
    /// Log escalation rounds
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Write the JSON result here instead of stdout
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Certified turn direction of a, b, c
    Orient {
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        a: (f64, f64),
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        b: (f64, f64),
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        c: (f64, f64),
    },
    /// Whether two segments cross, and where
    Intersect {
        #[arg(long, value_parser = parse_segment, allow_hyphen_values = true)]
        s: [f64; 4],
        #[arg(long, value_parser = parse_segment, allow_hyphen_values = true)]
        t: [f64; 4],
    },
    /// Enclosure of the square root of a perturbed literal
    Sqrt {
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
    },
    /// Print the version and the effective configuration
    Report,
}

#[derive(Serialize)]
struct Stats {
    evaluations: u64,
    escalations: u64,
    rounds: u64,
    max_bits: u32,
}

impl From<EscalationStats> for Stats {
    fn from(s: EscalationStats) -> Self {
        Self {
            evaluations: s.evaluations,
            escalations: s.escalations,
            rounds: s.rounds,
            max_bits: s.max_bits,
        }
    }
}

#[derive(Serialize)]
struct Orientation {
    sign: i32,
    turn: &'static str,
    stats: Stats,
}

#[derive(Serialize)]
struct Crossing {
    crosses: bool,
    point: Option<[f64; 2]>,
    stats: Stats,
}

#[derive(Serialize)]
struct Enclosure {
    lb: f64,
    ub: f64,
    mid: f64,
    bits: u32,
}

#[derive(Serialize)]
struct Report {
    version: &'static str,
    delta: f64,
    seed: u64,
    max_precision: u32,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    let cfg = config(&cmd)?;
    let _session = Session::with_cfg(cfg)?;
    let result = match cmd.action {
        Action::Orient { a, b, c } => serde_json::to_value(orient(a, b, c)?)?,
        Action::Intersect { s, t } => serde_json::to_value(intersect(s, t)?)?,
        Action::Sqrt { x } => serde_json::to_value(sqrt(x)?)?,
        Action::Report => serde_json::to_value(report())?,
    };
    emit(&result, cmd.out.as_deref())
}

fn config(cmd: &Cmd) -> Result<AcpCfg> {
    let mut cfg = AcpCfg::default();
    if let Some(delta) = cmd.delta {
        cfg.delta = delta;
    }
    if let Some(seed) = cmd.seed {
        cfg.seed = seed;
    }
    if let Some(bits) = cmd.max_precision {
        cfg.max_precision = bits;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn parse_coords<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {N} comma-separated numbers, got {:?}", s));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        let v: f64 = part
            .parse()
            .map_err(|e| format!("invalid number {part:?}: {e}"))?;
        if !v.is_finite() {
            return Err(format!("non-finite coordinate {part:?}"));
        }
        *slot = v;
    }
    Ok(out)
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let [x, y] = parse_coords::<2>(s)?;
    Ok((x, y))
}

fn parse_segment(s: &str) -> Result<[f64; 4], String> {
    parse_coords::<4>(s)
}

fn orient(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Result<Orientation> {
    tracing::info!(?a, ?b, ?c, "orient");
    let mut g = DependencyGraph::new();
    let mut ids = Vec::with_capacity(3);
    for (x, y) in [a, b, c] {
        ids.push(g.insert(InputPoint::new(x, y))?);
    }
    let sign = LeftTurn::new(ids[0], ids[1], ids[2])
        .eval(&mut g)
        .context("left-turn test")?;
    Ok(Orientation {
        sign,
        turn: if sign > 0 { "left" } else { "right" },
        stats: g.stats().into(),
    })
}

fn intersect(s: [f64; 4], t: [f64; 4]) -> Result<Crossing> {
    tracing::info!(?s, ?t, "intersect");
    let mut g = DependencyGraph::new();
    let mut ids = Vec::with_capacity(4);
    for [x, y] in [[s[0], s[1]], [s[2], s[3]], [t[0], t[1]], [t[2], t[3]]] {
        ids.push(g.insert(InputPoint::new(x, y))?);
    }
    let l = LineSegment::new(ids[0], ids[1]);
    let m = LineSegment::new(ids[2], ids[3]);
    let crosses = l.intersects(&mut g, &m).context("segment test")?;
    let at = if crosses {
        let x = g.insert(LineIntersection::new(ids[0], ids[1], ids[2], ids[3]))?;
        let p = point(&g, x).mid();
        Some([p.x, p.y])
    } else {
        None
    };
    Ok(Crossing {
        crosses,
        point: at,
        stats: g.stats().into(),
    })
}

fn sqrt(x: f64) -> Result<Enclosure> {
    tracing::info!(x, "sqrt");
    let p = Parameter::new(x);
    ensure!(p.sign()? > 0, "square root needs a positive argument, got {x}");
    let r = p.sqrt()?;
    Ok(Enclosure {
        lb: r.lb(),
        ub: r.ub(),
        mid: r.mid(),
        bits: r.bits(),
    })
}

fn report() -> Report {
    let cfg = context::config();
    Report {
        version: acp::VERSION,
        delta: cfg.delta,
        seed: cfg.seed,
        max_precision: cfg.max_precision,
    }
}

fn emit(value: &serde_json::Value, out: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("create {}", parent.display()))?;
                }
            }
            std::fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote result");
        }
        None => println!("{text}"),
    }
    Ok(())
}
