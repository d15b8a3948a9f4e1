//! Headless mode for the gunfight engine.
//!
//! A line-oriented driver over stdin/stdout, suited to scripted play and
//! automated testing.

use frontier_core::{
    weapons, Attributes, Combatant, Engagement, EngineConfig, Side, TurnError,
    WeaponCombatAction,
};
use std::io::{self, BufRead, Write};

/// Who is fighting, and with what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessConfig {
    pub name: String,
    pub weapon: String,
    pub opponent_name: String,
    pub opponent_weapon: String,
    /// Fixed dice seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            name: "Stranger".to_string(),
            weapon: weapons::DEFAULT_WEAPON.to_string(),
            opponent_name: "Black Bart".to_string(),
            opponent_weapon: "Winchester Rifle".to_string(),
            seed: None,
        }
    }
}

/// Run a gunfight in headless mode.
///
/// Protocol:
/// - `aim`, `fire [modifier]`, `reload`, `move <yards>` are player actions
/// - Lines starting with `#` are commands (status, record, help, quit)
/// - Every log line from the round is echoed with its kind
pub async fn run_headless(config: HeadlessConfig, engine: EngineConfig) -> anyhow::Result<()> {
    let player = Combatant::new(&config.name, gunfighter_attributes())
        .with_weapon(weapons::closest(&config.weapon));
    let opponent = Combatant::new(&config.opponent_name, outlaw_attributes())
        .with_weapon(weapons::closest(&config.opponent_weapon));

    println!("=== Frontier Headless Mode ===");
    println!("{} ({}) faces {} ({})",
             player.name, weapon_name(&player),
             opponent.name, weapon_name(&opponent));

    let engagement = match config.seed {
        Some(seed) => Engagement::seeded(player, opponent, engine, seed),
        None => Engagement::with_random_dice(player, opponent, engine),
    };

    println!("Range: {} yards", engagement.state().await.current_range);
    println!();
    print_help();
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            match command.trim() {
                "quit" | "exit" => {
                    println!("Goodbye!");
                    break;
                }
                "status" => print_status(&engagement).await,
                "record" => {
                    let record = engagement.record().await;
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
                "help" => print_help(),
                _ => println!("[ERROR] Unknown command. Type #help for help."),
            }
            stdout.flush().ok();
            continue;
        }

        let action = match parse_action(line) {
            Ok(action) => action,
            Err(e) => {
                println!("[ERROR] {e}");
                continue;
            }
        };

        match engagement.submit_action(action).await {
            Ok(outcome) => {
                println!("[ROUND {}]", outcome.round);
                let start = outcome.state.round_log.len() - count_new_entries(&outcome);
                for entry in &outcome.state.round_log[start..] {
                    let who = entry.side.as_ref().map(Side::name).unwrap_or("-");
                    let kind = format!("{:?}", entry.kind).to_lowercase();
                    println!("  {:<8} {:<8} {}", kind, who, entry.text);
                }
                if let Some(end) = outcome.ended {
                    println!("[OVER] {}", end.summary);
                    break;
                }
            }
            Err(TurnError::CombatOver) => {
                println!("[OVER] The fight is already decided.");
                break;
            }
            Err(e) => println!("[ERROR] {e}"),
        }
        stdout.flush().ok();
    }

    Ok(())
}

/// Log lines written during one round: one per action taken, plus the
/// closing summary if the fight ended.
fn count_new_entries(outcome: &frontier_core::RoundOutcome) -> usize {
    let taken = [&outcome.player_result, &outcome.opponent_result]
        .iter()
        .filter(|r| r.is_some())
        .count();
    let total = taken + usize::from(outcome.ended.is_some());
    total.min(outcome.state.round_log.len())
}

/// Parse one player action line.
pub fn parse_action(line: &str) -> Result<WeaponCombatAction, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["aim"] => Ok(WeaponCombatAction::Aim),
        ["fire"] | ["shoot"] => Ok(WeaponCombatAction::fire()),
        ["fire", modifier] | ["shoot", modifier] => {
            let modifier = modifier
                .parse::<i32>()
                .map_err(|_| format!("Not a modifier: {modifier}"))?;
            Ok(WeaponCombatAction::Fire {
                modifier: Some(modifier),
                damage: None,
            })
        }
        ["reload"] => Ok(WeaponCombatAction::Reload),
        ["move", yards] => yards
            .parse::<u32>()
            .map(WeaponCombatAction::move_to)
            .map_err(|_| format!("Not a range in yards: {yards}")),
        ["move"] => Err("Usage: move <yards>".to_string()),
        _ => Err(format!("Unknown action: {line}")),
    }
}

/// Parse headless configuration from command line arguments.
pub fn parse_config_from_args(args: &[String]) -> HeadlessConfig {
    let mut config = HeadlessConfig::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--name" => {
                if let Some(name) = args.get(i + 1) {
                    config.name = name.clone();
                    i += 1;
                }
            }
            "--weapon" => {
                if let Some(weapon) = args.get(i + 1) {
                    config.weapon = weapon.clone();
                    i += 1;
                }
            }
            "--opponent" => {
                if let Some(name) = args.get(i + 1) {
                    config.opponent_name = name.clone();
                    i += 1;
                }
            }
            "--opponent-weapon" => {
                if let Some(weapon) = args.get(i + 1) {
                    config.opponent_weapon = weapon.clone();
                    i += 1;
                }
            }
            "--seed" => {
                if let Some(seed) = args.get(i + 1) {
                    config.seed = seed.parse().ok();
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn gunfighter_attributes() -> Attributes {
    let mut attributes = Attributes::new(18);
    attributes.gun_accuracy = 12;
    attributes.bravery = 60;
    attributes.experience = 3;
    attributes
}

fn outlaw_attributes() -> Attributes {
    let mut attributes = Attributes::new(16);
    attributes.gun_accuracy = 8;
    attributes.bravery = 45;
    attributes
}

fn weapon_name(combatant: &Combatant) -> &str {
    combatant
        .weapon
        .as_ref()
        .map(|w| w.name.as_str())
        .unwrap_or("unarmed")
}

async fn print_status(engagement: &Engagement) {
    let state = engagement.state().await;
    let player = engagement.player().await;
    let opponent = engagement.opponent().await;
    println!("[STATUS]");
    println!("  Round: {}", state.round);
    println!("  Range: {} yards", state.current_range);
    for (combatant, aim) in [
        (&player, state.player_aim_bonus),
        (&opponent, state.opponent_aim_bonus),
    ] {
        println!("  {}: strength {}/{}, wounds {}, aim +{}",
                 combatant.name,
                 combatant.current_strength(true),
                 combatant.attributes.base_strength,
                 combatant.wounds.len(),
                 aim);
    }
}

fn print_help() {
    println!("Actions:");
    println!("  aim             - Steady your aim (+10, up to +20)");
    println!("  fire [modifier] - Fire, with an optional extra modifier");
    println!("  reload          - Reload your weapon");
    println!("  move <yards>    - Change the range");
    println!("Commands:");
    println!("  #status         - Show the state of the fight");
    println!("  #record         - Print the combat record as JSON");
    println!("  #help           - Show this help");
    println!("  #quit           - Exit");
}
