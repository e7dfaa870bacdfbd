//! Dialog readiness: opening, settling, and section expansion.

use regex::Regex;
use tracing::{debug, info, warn};

use shipclip_cdp::{CdpError, TabSession};

use crate::config::{SourceConfig, TimingConfig};
use crate::dom;
use crate::error::CopyError;

/// Make sure the shipping-label dialog is open and return its root.
///
/// Resolution order:
/// 1. the dialog root selector already matches: use it;
/// 2. a generic dialog root is open and its text matches the title
///    pattern: use it;
/// 3. find the trigger control (by class, then by exact visible text,
///    case-insensitively), click it, and wait for the dialog root. A
///    missing trigger fails immediately with no wait.
pub async fn ensure_dialog_open(
    session: &TabSession,
    source: &SourceConfig,
    timing: &TimingConfig,
) -> Result<i64, CopyError> {
    if let Some(existing) = session.query_selector(&source.dialog_selector).await? {
        debug!("dialog already open");
        return Ok(existing);
    }

    if let Some(generic) = find_generic_dialog(session, source).await? {
        debug!("accepting already-open generic dialog root");
        return Ok(generic);
    }

    let doc = session.document().await?;
    let trigger = match session.query_selector(&source.open_button_selector).await? {
        Some(node) => Some(node),
        None => dom::find_button_by_text(session, doc, &source.open_button_text).await?,
    };

    let Some(trigger) = trigger else {
        return Err(CopyError::ActionUnavailable(format!(
            "no control to open the label dialog ({} / {:?})",
            source.open_button_selector, source.open_button_text
        )));
    };

    session.click_node(trigger).await?;
    info!("clicked the open-dialog control");

    let dialog = session
        .wait_for_selector(
            &source.dialog_selector,
            timing.wait_timeout(),
            timing.poll_interval(),
        )
        .await
        .map_err(|e| match e {
            CdpError::Timeout(_) => CopyError::NotFound {
                locator: source.dialog_selector.clone(),
            },
            other => CopyError::Browser(other),
        })?;

    Ok(dialog)
}

/// Check the generic dialog roots for one whose text matches the title
/// pattern.
async fn find_generic_dialog(
    session: &TabSession,
    source: &SourceConfig,
) -> Result<Option<i64>, CopyError> {
    let title_re = compile_pattern(&source.dialog_title_pattern);

    for selector in &source.generic_dialog_selectors {
        if let Some(node) = session.query_selector(selector).await? {
            let text = dom::inner_text(session, node).await?;
            if title_re.as_ref().is_some_and(|re| re.is_match(&text)) {
                return Ok(Some(node));
            }
        }
    }

    Ok(None)
}

/// Wait for the dialog's address content to render.
///
/// Polls for either suggestion-card or section markup, bounded by the
/// settle budget; when the budget elapses with neither present the
/// pipeline proceeds anyway and extraction reports what it finds. This
/// is the known race-prone point: the host validates addresses
/// asynchronously and exposes no completion signal, so the budget is a
/// heuristic upper bound, not a guarantee.
pub async fn await_dialog_content(
    session: &TabSession,
    dialog: i64,
    source: &SourceConfig,
    timing: &TimingConfig,
) {
    let start = std::time::Instant::now();

    while start.elapsed() < timing.settle() {
        let suggestion = session
            .query_selector_from(dialog, &source.suggestion_card)
            .await
            .unwrap_or(None);
        let section = session
            .query_selector_from(dialog, &source.section_container)
            .await
            .unwrap_or(None);

        if suggestion.is_some() || section.is_some() {
            debug!("dialog content present after {:?}", start.elapsed());
            return;
        }

        tokio::time::sleep(timing.poll_interval()).await;
    }

    warn!("dialog content did not appear within the settle budget");
}

/// Expand the collapsible address section and return its container.
///
/// Locates the section whose toggle heading matches the configured
/// pattern. Already-expanded sections are left alone. A missing section
/// is non-fatal: manual extraction will simply find no fields.
pub async fn expand_address_section(
    session: &TabSession,
    dialog: i64,
    source: &SourceConfig,
    timing: &TimingConfig,
) -> Result<Option<i64>, CopyError> {
    let heading_re = compile_pattern(&source.section_heading_pattern);

    for container in session
        .query_selector_all_from(dialog, &source.section_container)
        .await?
    {
        let Some(toggle) = session
            .query_selector_from(container, &source.section_toggle)
            .await?
        else {
            continue;
        };

        let heading = dom::inner_text(session, toggle).await?;
        if !heading_re.as_ref().is_some_and(|re| re.is_match(&heading)) {
            continue;
        }

        let expanded = session.attribute(toggle, "aria-expanded").await?;
        if expanded.as_deref() == Some("true") {
            debug!("address section already expanded");
        } else {
            session.click_node(toggle).await?;
            info!("expanded address section {:?}", heading.trim());
            tokio::time::sleep(timing.settle()).await;
        }

        return Ok(Some(container));
    }

    debug!("no collapsible address section located");
    Ok(None)
}

/// Compile a config-supplied pattern, degrading to no-match on bad
/// input rather than failing the pipeline.
fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("invalid configured pattern {:?}: {}", pattern, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_pattern_valid() {
        let re = compile_pattern("(?i)create shipping label").unwrap();
        assert!(re.is_match("Create Shipping Label"));
        assert!(!re.is_match("Refund order"));
    }

    #[test]
    fn test_compile_pattern_invalid_degrades() {
        assert!(compile_pattern("(unclosed").is_none());
    }

    #[test]
    fn test_section_heading_default_pattern_matches() {
        let re = compile_pattern("(?i)address").unwrap();
        assert!(re.is_match("Shipping address"));
        assert!(re.is_match("ADDRESS DETAILS"));
        assert!(!re.is_match("Package weight"));
    }
}
