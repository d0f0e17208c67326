use crate::config::types::{
    BudgetConfig, CheckpointConfig, Config, ForumConfig, TraversalConfig, TraversalPolicy,
    UserAgentConfig, VisitedKey,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let base = validate_forum_config(&config.forum)?;
    validate_traversal_config(&config.traversal, &config.forum, &base)?;
    validate_budget_config(&config.budget)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_checkpoint_config(&config.checkpoint)?;
    validate_scan_position(&config.traversal, &config.checkpoint)?;
    Ok(())
}

/// Validates the forum section and returns the parsed base URL
fn validate_forum_config(config: &ForumConfig) -> Result<Url, ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url must use HTTP or HTTPS, got '{}'",
            base.scheme()
        )));
    }

    if let Some(page) = &config.latest_post_page {
        Url::parse(page).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid latest-post-page '{}': {}", page, e))
        })?;
    }

    Ok(base)
}

/// Validates traversal settings against the forum section
fn validate_traversal_config(
    config: &TraversalConfig,
    forum: &ForumConfig,
    base: &Url,
) -> Result<(), ConfigError> {
    match config.policy {
        TraversalPolicy::Frontier => {
            if forum.seeds.is_empty() {
                return Err(ConfigError::Validation(
                    "frontier traversal needs at least one seed URL".to_string(),
                ));
            }

            for seed in &forum.seeds {
                let url = Url::parse(seed).map_err(|e| {
                    ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e))
                })?;

                if url.origin() != base.origin() {
                    return Err(ConfigError::Validation(format!(
                        "Seed URL '{}' is outside the forum at {}",
                        seed, base
                    )));
                }
            }

            // Listing pages carry no post ID to key on
            if config.visited_key == VisitedKey::PostId {
                return Err(ConfigError::Validation(
                    "frontier traversal requires visited-key = \"url\"".to_string(),
                ));
            }

            if config.max_frontier < 1 {
                return Err(ConfigError::Validation(format!(
                    "max-frontier must be >= 1, got {}",
                    config.max_frontier
                )));
            }
        }
        TraversalPolicy::Sequential => {
            let template = forum.post_url_template.as_deref().ok_or_else(|| {
                ConfigError::Validation(
                    "sequential traversal needs forum.post-url-template".to_string(),
                )
            })?;

            if !template.contains("{id}") {
                return Err(ConfigError::Validation(format!(
                    "post-url-template must contain '{{id}}', got '{}'",
                    template
                )));
            }

            Url::parse(&template.replace("{id}", "1")).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid post-url-template: {}", e))
            })?;

            if config.discover_latest && forum.latest_post_page.is_none() {
                return Err(ConfigError::Validation(
                    "discover-latest needs forum.latest-post-page".to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// Validates per-run limits
fn validate_budget_config(config: &BudgetConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if let Some(attempts) = config.max_attempts {
        if attempts < config.max_pages {
            return Err(ConfigError::Validation(format!(
                "max-attempts ({}) must be >= max-pages ({})",
                attempts, config.max_pages
            )));
        }
    }

    if config.max_scripts == Some(0) {
        return Err(ConfigError::Validation(
            "max-scripts must be >= 1 when set".to_string(),
        ));
    }

    if let Some(minute) = config.cutoff_minute {
        if minute > 59 {
            return Err(ConfigError::Validation(format!(
                "cutoff-minute must be between 0 and 59, got {}",
                minute
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates checkpoint paths
fn validate_checkpoint_config(config: &CheckpointConfig) -> Result<(), ConfigError> {
    if config.visited_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "visited-path cannot be empty".to_string(),
        ));
    }

    if config.scripts_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "scripts-path cannot be empty".to_string(),
        ));
    }

    if config.visited_path == config.scripts_path {
        return Err(ConfigError::Validation(
            "visited-path and scripts-path must differ".to_string(),
        ));
    }

    if config.visited_cap < 1 {
        return Err(ConfigError::Validation(format!(
            "visited-cap must be >= 1, got {}",
            config.visited_cap
        )));
    }

    Ok(())
}

/// Sequential scans resume from a persisted position
fn validate_scan_position(
    traversal: &TraversalConfig,
    checkpoint: &CheckpointConfig,
) -> Result<(), ConfigError> {
    if traversal.policy != TraversalPolicy::Sequential {
        return Ok(());
    }

    let path = checkpoint.position_path.as_ref().ok_or_else(|| {
        ConfigError::Validation("sequential traversal needs checkpoint.position-path".to_string())
    })?;

    if path == &checkpoint.visited_path || path == &checkpoint.scripts_path {
        return Err(ConfigError::Validation(
            "position-path must differ from visited-path and scripts-path".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let (local, domain) = email.split_once('@').ok_or_else(|| {
        ConfigError::Validation(format!("Invalid email format: '{}'", email))
    })?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
