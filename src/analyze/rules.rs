//! Scoring rule table: weighted keyword categories, block/penalty lists,
//! spam phrases, bonus terms and dangerous short tokens.
//!
//! Categories are an ordered list and are evaluated in that order. The
//! built-in seed can be overridden with a TOML file; any section left out of
//! the file keeps its seed value.
//!
//! ```toml
//! block = ["senior", "manager"]
//! penalty = ["pleno"]
//! penalty_points = 10
//!
//! [[categories]]
//! name = "dream_job"
//! points = 30
//! keywords = ["pentest", "red team"]
//! ```

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::antispam::DEFAULT_SPAM_PHRASES;
use crate::analyze::keywords::DEFAULT_DANGEROUS_TOKENS;

pub const ENV_RULES_PATH: &str = "JOBPULSE_RULES_PATH";
pub const DEFAULT_RULES_PATH: &str = "config/scoring.toml";
/// Upper bound for any configured point value.
pub const MAX_POINTS: i32 = 1000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub points: i32,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BonusRule {
    pub points: i32,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub categories: Vec<CategoryRule>,
    pub block: Vec<String>,
    pub penalty: Vec<String>,
    pub penalty_points: i32,
    pub spam: Vec<String>,
    pub dangerous_tokens: Vec<String>,
    pub intern_bonus: BonusRule,
    pub junior_bonus: BonusRule,
    pub hot_threshold: i32,
    pub cyber_terms: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn category(name: &str, points: i32, keywords: &[&str]) -> CategoryRule {
    CategoryRule {
        name: name.to_string(),
        points,
        keywords: strings(keywords),
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        let categories = vec![
            category(
                "dream_job",
                30,
                &[
                    "segurança", "security", "cyber", "ciber", "pentest",
                    "vulnerabilidade", "defensiva", "offensive", "red team",
                    "blue team", "nmap", "burp", "owasp", "soc", "noc",
                ],
            ),
            category(
                "core_tech",
                15,
                &[
                    "python", "sql", "linux", "docker", "aws", "git", "selenium",
                    "automação", "script", "bash", "suporte", "infraestrutura",
                    "redes", "help desk", "service desk",
                ],
            ),
            category(
                "general_tech",
                10,
                &[
                    "ti", "t.i.", "tecnologia", "informática", "computação",
                    "sistemas", "software", "desenvolvimento", "programação",
                    "análise de dados", "desenvolvedor", "developer", "programador",
                    "engenharia de software",
                ],
            ),
            category(
                "secondary",
                10,
                &[
                    "django", "flask", "fastapi", "pandas", "react", "javascript",
                    "api", "rest", "html", "css", "java", "node", "c#", ".net",
                    "golang", "go", "ruby", "php", "laravel", "spring", "vue",
                    "angular", "ia", "ai", "artificial intelligence", "nlp", "llm",
                ],
            ),
            category(
                "sales",
                20,
                &[
                    "sdr", "bdr", "vendas", "comercial", "closer", "inside sales",
                    "customer success",
                ],
            ),
        ];

        Self {
            categories,
            block: strings(&[
                "sênior", "senior", "specialist", "especialista", "manager", "gerente",
                "coordenador", "motorista", "recepcionista", "estoquista",
                "operador de caixa", "atendente", "loja", "auxiliar administrativo",
                "secretária", "enfermeiro", "técnico de enfermagem", "médico",
                "advogado", "cozinheiro", "garçom", "manobrista", "portaria",
                "vigilante", "limpeza", "obra", "pedreiro", "servente",
                "eletricista predial", "mecânico", "produção", "telemarketing",
                "call center", "cobrança", "rh", "recursos humanos",
                "departamento pessoal", "contábil", "fiscal", "financeiro",
                "almoxarife", "logística",
            ]),
            penalty: strings(&["pleno"]),
            penalty_points: 10,
            spam: strings(DEFAULT_SPAM_PHRASES),
            dangerous_tokens: strings(DEFAULT_DANGEROUS_TOKENS),
            intern_bonus: BonusRule {
                points: 20,
                terms: strings(&["estágio", "estagiário", "intern"]),
            },
            junior_bonus: BonusRule {
                points: 10,
                terms: strings(&["junior", "júnior", "trainee"]),
            },
            hot_threshold: 80,
            cyber_terms: strings(&["segurança", "security", "cyber", "ciber"]),
        }
    }
}

impl ScoringRules {
    /// Parse rules from a TOML string and validate them.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let mut rules: ScoringRules = toml::from_str(toml_str)?;
        rules.normalize();
        rules.validate()?;
        Ok(rules)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scoring rules from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing scoring rules at {}", path.display()))
    }

    /// Resolution order:
    /// 1) explicit `path`
    /// 2) $JOBPULSE_RULES_PATH (must exist)
    /// 3) config/scoring.toml if present
    /// 4) built-in seed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(p) = path {
            return Self::load_from(p);
        }
        if let Ok(p) = std::env::var(ENV_RULES_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!(
                "{ENV_RULES_PATH} points to non-existent path {}",
                pb.display()
            ));
        }
        let default_p = PathBuf::from(DEFAULT_RULES_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::default())
    }

    /// Trims and lower-cases every phrase and drops empty ones. Scored text
    /// is lower-cased, so phrases must be too.
    pub fn normalize(&mut self) {
        for c in &mut self.categories {
            c.name = c.name.trim().to_string();
            clean_terms(&mut c.keywords);
        }
        clean_terms(&mut self.block);
        clean_terms(&mut self.penalty);
        clean_terms(&mut self.spam);
        clean_terms(&mut self.dangerous_tokens);
        clean_terms(&mut self.intern_bonus.terms);
        clean_terms(&mut self.junior_bonus.terms);
        clean_terms(&mut self.cyber_terms);
    }

    fn validate(&self) -> Result<()> {
        for c in &self.categories {
            if c.name.is_empty() {
                return Err(anyhow!("category with empty name"));
            }
            if !(0..=MAX_POINTS).contains(&c.points) {
                return Err(anyhow!(
                    "category `{}` points must be within 0..={MAX_POINTS} ({})",
                    c.name,
                    c.points
                ));
            }
        }
        if !(0..=MAX_POINTS).contains(&self.penalty_points) {
            return Err(anyhow!("penalty_points must be within 0..={MAX_POINTS}"));
        }
        for (name, bonus) in [("intern_bonus", &self.intern_bonus), ("junior_bonus", &self.junior_bonus)] {
            if !(0..=MAX_POINTS).contains(&bonus.points) {
                return Err(anyhow!("{name}.points must be within 0..={MAX_POINTS}"));
            }
        }
        Ok(())
    }
}

fn clean_terms(terms: &mut Vec<String>) {
    for t in terms.iter_mut() {
        *t = t.trim().to_lowercase();
    }
    terms.retain(|t| !t.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn seed_keeps_category_order() {
        let r = ScoringRules::default();
        let names: Vec<&str> = r.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["dream_job", "core_tech", "general_tech", "secondary", "sales"]
        );
        let points: Vec<i32> = r.categories.iter().map(|c| c.points).collect();
        assert_eq!(points, vec![30, 15, 10, 10, 20]);
    }

    #[test]
    fn partial_toml_keeps_seed_for_missing_sections() {
        let r = ScoringRules::from_toml_str(
            r#"
penalty = ["pleno", "mid-level"]
dangerous_tokens = ["ti", "go", "java"]
"#,
        )
        .unwrap();
        assert_eq!(r.penalty, vec!["pleno", "mid-level"]);
        assert!(r.dangerous_tokens.iter().any(|t| t == "java"));
        assert_eq!(r.categories.len(), 5);
        assert_eq!(r.hot_threshold, 80);
    }

    #[test]
    fn negative_points_rejected() {
        let err = ScoringRules::from_toml_str(
            r#"
[[categories]]
name = "broken"
points = -5
keywords = ["x"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("points must be within"));
    }

    #[test]
    fn oversized_points_rejected() {
        assert!(ScoringRules::from_toml_str("penalty_points = 2147483647\n").is_err());
        assert!(ScoringRules::from_toml_str("[intern_bonus]\npoints = 5000\nterms = [\"estágio\"]\n").is_err());
        assert!(ScoringRules::from_toml_str("penalty_points = 1000\n").is_ok());
    }

    #[test]
    fn phrases_are_trimmed_lowercased_and_non_empty() {
        let r = ScoringRules::from_toml_str(
            r#"
block = [" Senior ", ""]
cyber_terms = ["CyberSec"]

[intern_bonus]
points = 20
terms = ["", "Estágio"]
"#,
        )
        .unwrap();
        assert_eq!(r.block, vec!["senior"]);
        assert_eq!(r.cyber_terms, vec!["cybersec"]);
        assert_eq!(r.intern_bonus.terms, vec!["estágio"]);
    }

    #[serial_test::serial]
    #[test]
    fn load_prefers_env_then_seed() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_RULES_PATH);

        // Nothing on disk -> seed
        let seed = ScoringRules::load(None).unwrap();
        assert_eq!(seed, ScoringRules::default());

        let p = tmp.path().join("rules.toml");
        fs::write(&p, "hot_threshold = 70\n").unwrap();
        env::set_var(ENV_RULES_PATH, p.display().to_string());
        let from_env = ScoringRules::load(None).unwrap();
        assert_eq!(from_env.hot_threshold, 70);

        env::set_var(ENV_RULES_PATH, tmp.path().join("missing.toml"));
        assert!(ScoringRules::load(None).is_err());

        env::remove_var(ENV_RULES_PATH);
        env::set_current_dir(&old).unwrap();
    }
}
