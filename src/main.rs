//! Donut Arcade headless driver
//!
//! Plays an autopilot runner session and an autoplayed tiles session, banks
//! the results into a save file and prints a summary. The browser build
//! enters through `web::start` instead.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::fs;
    use std::process::ExitCode;

    use donut_arcade::consts::{TICK_MS, TICKS_PER_SECOND};
    use donut_arcade::persistence::FileStore;
    use donut_arcade::rhythm::{Chart, MissPolicy, RhythmPhase, RhythmSession, autoplay};
    use donut_arcade::sim::{RunnerEvent, TickInput, tick};
    use donut_arcade::{Costume, Profile, Tuning};

    struct Config {
        seed: u64,
        ticks: u64,
        tuning_path: Option<String>,
        chart_path: Option<String>,
        save_path: String,
        lenient: bool,
        buy: Option<String>,
        wallet_only: bool,
        tiles: bool,
        quiet: bool,
    }

    impl Default for Config {
        fn default() -> Self {
            Self {
                seed: 42,
                ticks: 60 * 60 * 3,
                tuning_path: None,
                chart_path: None,
                save_path: "donut-arcade.json".to_string(),
                lenient: false,
                buy: None,
                wallet_only: false,
                tiles: true,
                quiet: false,
            }
        }
    }

    fn value(args: &[String], i: usize, flag: &str) -> Result<String, String> {
        args.get(i)
            .cloned()
            .ok_or_else(|| format!("{flag} requires a value"))
    }

    fn number(args: &[String], i: usize, flag: &str) -> Result<u64, String> {
        value(args, i, flag)?
            .parse()
            .map_err(|_| format!("{flag} requires a number"))
    }

    fn parse_args() -> Result<Option<Config>, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut config = Config::default();
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--seed" => {
                    i += 1;
                    config.seed = number(&args, i, "--seed")?;
                }
                "--ticks" => {
                    i += 1;
                    config.ticks = number(&args, i, "--ticks")?;
                }
                "--tuning" => {
                    i += 1;
                    config.tuning_path = Some(value(&args, i, "--tuning")?);
                }
                "--chart" => {
                    i += 1;
                    config.chart_path = Some(value(&args, i, "--chart")?);
                }
                "--save" => {
                    i += 1;
                    config.save_path = value(&args, i, "--save")?;
                }
                "--buy" => {
                    i += 1;
                    config.buy = Some(value(&args, i, "--buy")?);
                }
                "--lenient" => config.lenient = true,
                "--wallet" => config.wallet_only = true,
                "--no-tiles" => config.tiles = false,
                "--quiet" => config.quiet = true,
                "--help" | "-h" => {
                    print_usage();
                    return Ok(None);
                }
                other => return Err(format!("Unknown argument: {other}")),
            }
            i += 1;
        }
        Ok(Some(config))
    }

    fn print_usage() {
        eprintln!(
            "Donut Arcade headless driver\n\
             \n\
             Usage: donut-arcade [OPTIONS]\n\
             \n\
             Options:\n\
             \x20 --seed N        Runner RNG seed (default: 42)\n\
             \x20 --ticks N       Max runner ticks (default: 10800 = 3 minutes)\n\
             \x20 --tuning FILE   Balance overrides (JSON)\n\
             \x20 --chart FILE    Tiles chart (JSON, default: built-in)\n\
             \x20 --save FILE     Save file (default: donut-arcade.json)\n\
             \x20 --buy NAME      Buy and select a costume, then exit\n\
             \x20 --wallet        Print balances and unlocks, then exit\n\
             \x20 --lenient       Stray taps and missed tiles only reset the combo\n\
             \x20 --no-tiles      Skip the tiles session\n\
             \x20 --quiet         Only the final summary\n\
             \x20 --help, -h      Show this help"
        );
    }

    fn load_tuning(path: Option<&str>) -> Result<Tuning, String> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
        Tuning::from_json(&json).map_err(|e| format!("{path}: {e}"))
    }

    fn load_chart(path: Option<&str>, lane_count: usize) -> Chart {
        let Some(path) = path else {
            return Chart::default();
        };
        match fs::read_to_string(path) {
            Ok(json) => Chart::from_json_or_default(&json, lane_count),
            Err(e) => {
                log::warn!("Could not read chart {path} ({e}), using built-in chart");
                Chart::default()
            }
        }
    }

    fn print_wallet(profile: &Profile) {
        let wallet = &profile.progression.wallet;
        println!(
            "Wallet: {} coins, {} strawberries, {} chocolates",
            wallet.coins, wallet.strawberries, wallet.chocolates
        );
        let unlocked: Vec<&str> = profile
            .progression
            .unlocked
            .iter()
            .map(|c| c.name())
            .collect();
        println!("Costumes: {}", unlocked.join(", "));
        println!("Wearing: {}", profile.settings.selected_costume.name());
    }

    fn buy(profile: &mut Profile, name: &str) -> Result<(), String> {
        let costume = Costume::from_name(name).ok_or_else(|| {
            let names: Vec<&str> = Costume::ALL.iter().map(|c| c.name()).collect();
            format!("Unknown costume {name:?} (one of: {})", names.join(", "))
        })?;
        profile
            .progression
            .acquire(costume)
            .map_err(|e| e.to_string())?;
        profile
            .settings
            .select_costume(costume, &profile.progression);
        println!("Wearing {}", costume.name());
        Ok(())
    }

    /// A tiles session from the profile, with `--lenient` applied to this
    /// session only
    fn tiles_session(
        profile: &Profile,
        chart: Chart,
        tuning: &Tuning,
        lenient: bool,
    ) -> RhythmSession {
        let mut session = profile.new_tiles(chart, tuning);
        if lenient {
            session.tuning.miss_policy = MissPolicy::lenient();
        }
        session
    }

    pub fn run() -> ExitCode {
        let config = match parse_args() {
            Ok(Some(config)) => config,
            Ok(None) => return ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e}");
                print_usage();
                return ExitCode::FAILURE;
            }
        };
        let tuning = match load_tuning(config.tuning_path.as_deref()) {
            Ok(tuning) => tuning,
            Err(e) => {
                eprintln!("Invalid tuning: {e}");
                return ExitCode::FAILURE;
            }
        };

        let mut store = FileStore::open(&config.save_path);
        let mut profile = Profile::load(&store);

        if config.wallet_only {
            print_wallet(&profile);
            return ExitCode::SUCCESS;
        }
        if let Some(name) = config.buy.as_deref() {
            return match buy(&mut profile, name) {
                Ok(()) => {
                    profile.save(&mut store);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("{e}");
                    ExitCode::FAILURE
                }
            };
        }
        // Runner
        let mut state = profile.new_run(config.seed, &tuning);
        let input = TickInput {
            actions: Vec::new(),
            autopilot: true,
        };
        for _ in 0..config.ticks {
            tick(&mut state, &input);
            for event in state.drain_events() {
                if config.quiet {
                    continue;
                }
                match event {
                    RunnerEvent::LetterSetComplete => println!("  DONUT! bonus banked"),
                    RunnerEvent::SpeedUp { speed } => println!("  speed up: {speed:.1}"),
                    RunnerEvent::GameOver { reason } => println!("  game over: {reason}"),
                    _ => {}
                }
            }
            if state.is_game_over() {
                break;
            }
        }
        let seconds = state.time_ticks as f64 / TICKS_PER_SECOND as f64;
        let settlement = profile.finish_run(&state);
        let wallet = state.player.wallet;
        println!(
            "Runner: score {} over {:.0}m in {:.1}s ({} coins, {} strawberries, {} chocolates){}",
            settlement.score,
            state.distance,
            seconds,
            wallet.coins,
            wallet.strawberries,
            wallet.chocolates,
            settlement
                .rank
                .map(|r| format!(" - high score #{r}"))
                .unwrap_or_default()
        );

        // Tiles
        if config.tiles {
            let chart = load_chart(config.chart_path.as_deref(), tuning.rhythm.lane_count);
            let mut session = tiles_session(&profile, chart, &tuning, config.lenient);
            let max_frames = ((session.chart.length_ms() + 5_000.0) / TICK_MS) as u64;
            for _ in 0..max_frames {
                for input in autoplay(&session) {
                    session.handle_input(input);
                }
                session.advance(TICK_MS);
                if session.is_finished() {
                    break;
                }
            }
            if session.phase == RhythmPhase::Running {
                log::warn!("Tiles session still running after the chart ended");
            }
            let settlement = profile.finish_tiles(&session);
            let counts = session.counts;
            println!(
                "Tiles: score {} ({:?}), accuracy {:.1}%, max combo {}, \
                 {}/{}/{} perfect/great/good, {} missed{}",
                settlement.score,
                session.phase,
                session.accuracy(),
                session.max_combo,
                counts.perfect,
                counts.great,
                counts.good,
                counts.missed,
                settlement
                    .rank
                    .map(|r| format!(" - high score #{r}"))
                    .unwrap_or_default()
            );
        }

        profile.save(&mut store);
        if !config.quiet {
            print_wallet(&profile);
        }
        ExitCode::SUCCESS
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use donut_arcade::persistence::MemoryStore;

        #[test]
        fn test_lenient_flag_is_not_saved() {
            let mut store = MemoryStore::default();
            let profile = Profile::default();
            let session = tiles_session(&profile, Chart::default(), &Tuning::default(), true);
            assert_eq!(session.tuning.miss_policy, MissPolicy::lenient());

            profile.save(&mut store);
            let reloaded = Profile::load(&store);
            assert_eq!(reloaded.settings.miss_policy, None);
            let next = tiles_session(&reloaded, Chart::default(), &Tuning::default(), false);
            assert_eq!(next.tuning.miss_policy, MissPolicy::strict());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}
