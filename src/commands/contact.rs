use anyhow::Result;
use owo_colors::OwoColorize;
use showlist_core::ShowListConfig;
use showlist_core::page::{ContactForm, FormMessageKind};

use crate::utils::create_spinner;

pub async fn run(
    config: &ShowListConfig,
    fields: Vec<(String, String)>,
    action: Option<String>,
) -> Result<()> {
    let Some(action) = action.or_else(|| config.contact_action.clone()) else {
        anyhow::bail!(
            "No contact form action configured.\n\n\
            Pass --action <URL> or set contact_action in config.toml"
        );
    };

    let mut form = ContactForm::new(&action, "SEND MESSAGE");
    for (name, value) in &fields {
        form.set_field(name, value);
    }

    let spinner = create_spinner(form.button.label.clone());
    let http = reqwest::Client::new();
    let kind = form.submit(&http).await;
    spinner.finish_and_clear();

    let text = match kind {
        FormMessageKind::Success => showlist_core::page::SUCCESS_MESSAGE.green().to_string(),
        FormMessageKind::Error => showlist_core::page::ERROR_MESSAGE.red().to_string(),
    };
    println!("{}", text);

    if kind == FormMessageKind::Error {
        anyhow::bail!("Contact form submission to {} failed", action);
    }
    Ok(())
}
