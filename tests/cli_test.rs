use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{TempDir, tempdir};

const RESPONSE: &str = "\
### STATUS FINANCEIRO
Equilibrado
As contas fecham, mas sem folga.

### NÚMERO ÚNICO DE FOCO
Sobra Real: R$ 450,00

### RESUMO DO MÊS
- Renda Total: R$ 4.000,00
- Sobra Real: R$ 450,00

### DICA DE OURO
Separe a reserva antes de gastar.
";

const PERSONAL_DATA: &str = r#"{"period":"Abril 2024","income":4000,"housing":1500,"food":900}"#;

/// A binary invocation isolated inside `dir`.
fn nucleo(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nucleo").unwrap();
    cmd.env("NUCLEO_DATA_DIR", dir.join("data"))
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .env("NUCLEO_LOG", "off")
        .arg("--config")
        .arg(dir.join("config.toml"))
        .arg("--no-interactive");
    cmd
}

fn logged_in() -> TempDir {
    let dir = tempdir().unwrap();
    nucleo(dir.path()).arg("login").assert().success();
    dir
}

fn write_inputs(dir: &Path) {
    std::fs::write(dir.join("personal.json"), PERSONAL_DATA).unwrap();
    std::fs::write(dir.join("response.md"), RESPONSE).unwrap();
}

fn analyze(dir: &Path) -> Command {
    let mut cmd = nucleo(dir);
    cmd.args(["analyze", "personal", "--data-file"])
        .arg(dir.join("personal.json"))
        .arg("--dry-run")
        .arg(dir.join("response.md"));
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_commands() {
        Command::cargo_bin("nucleo")
            .unwrap()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("analyze"))
            .stdout(predicate::str::contains("history"))
            .stdout(predicate::str::contains("profile"));
    }

    #[test]
    fn test_history_requires_login() {
        let dir = tempdir().unwrap();
        nucleo(dir.path())
            .args(["history", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Acesso restrito"));
    }

    #[test]
    fn test_login_then_empty_history() {
        let dir = logged_in();
        nucleo(dir.path())
            .args(["history", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Nenhuma análise salva."));

        nucleo(dir.path()).arg("logout").assert().success();
        nucleo(dir.path()).args(["history", "list"]).assert().failure();
    }

    #[test]
    fn test_dry_run_analysis_is_shown_and_saved() {
        let dir = logged_in();
        write_inputs(dir.path());

        analyze(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Consultoria CPF ▸ Abril 2024"))
            .stdout(predicate::str::contains("Equilibrado"))
            .stdout(predicate::str::contains("Renda Total: R$ 4.000,00"))
            .stdout(predicate::str::contains("Separe a reserva antes de gastar."));

        nucleo(dir.path())
            .args(["history", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Abril 2024"))
            .stdout(predicate::str::contains("R$ 4.000,00"))
            .stdout(predicate::str::contains("R$ 450,00"));
    }

    #[test]
    fn test_json_output_and_history_round_trip() {
        let dir = logged_in();
        write_inputs(dir.path());

        let out = analyze(dir.path())
            .args(["-F", "json"])
            .output()
            .unwrap();
        assert!(out.status.success());
        let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
        assert_eq!(value["type"], "CPF");
        assert_eq!(value["period"], "Abril 2024");
        assert_eq!(value["summary"]["faturamento"], "R$ 4.000,00");
        assert_eq!(value["dashboard"]["status"]["status"], "Healthy");
        let id = value["id"].as_str().unwrap().to_string();

        nucleo(dir.path())
            .args(["history", "show", &id[..8]])
            .assert()
            .success()
            .stdout(predicate::str::contains("Sobra Real"));

        nucleo(dir.path())
            .args(["history", "delete", &id])
            .assert()
            .success()
            .stdout(predicate::str::contains("removida"));

        nucleo(dir.path())
            .args(["history", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Nenhuma análise salva."));
    }

    #[test]
    fn test_output_file_gets_raw_response() {
        let dir = logged_in();
        write_inputs(dir.path());
        let target = dir.path().join("out").join("analysis.md");

        analyze(dir.path()).arg("-O").arg(&target).assert().success();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), RESPONSE);
    }

    #[test]
    fn test_toml_data_file() {
        let dir = logged_in();
        write_inputs(dir.path());
        let data = dir.path().join("personal.toml");
        std::fs::write(&data, "period = \"Maio 2024\"\nincome = 3500.0\nhousing = 1200.0\n")
            .unwrap();

        let out = nucleo(dir.path())
            .args(["-F", "json", "analyze", "personal", "--data-file"])
            .arg(&data)
            .arg("--dry-run")
            .arg(dir.path().join("response.md"))
            .output()
            .unwrap();
        assert!(out.status.success());
        let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
        assert_eq!(value["period"], "Maio 2024");
    }

    #[test]
    fn test_invalid_toml_data_file() {
        let dir = logged_in();
        write_inputs(dir.path());
        let data = dir.path().join("personal.toml");
        std::fs::write(&data, "income = [").unwrap();

        nucleo(dir.path())
            .args(["analyze", "personal", "--data-file"])
            .arg(&data)
            .arg("--dry-run")
            .arg(dir.path().join("response.md"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid personal data"));
    }

    #[test]
    fn test_no_interactive_needs_data_file() {
        let dir = logged_in();
        nucleo(dir.path())
            .args(["analyze", "business"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--data-file"));
    }

    #[test]
    fn test_missing_api_key_is_generic_failure() {
        let dir = logged_in();
        write_inputs(dir.path());
        nucleo(dir.path())
            .args(["analyze", "personal", "--data-file"])
            .arg(dir.path().join("personal.json"))
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Não foi possível processar os dados agora.",
            ));
    }

    #[test]
    fn test_profile_show_without_profile() {
        let dir = tempdir().unwrap();
        nucleo(dir.path())
            .args(["profile", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Nenhum perfil configurado"));
    }
}
