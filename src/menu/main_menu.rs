use crate::config::save::save_settings;
use crate::config::{Config, Language, PreviewSettings};
use crate::menu::handlers::{run_batch_preview, run_single_preview};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use rust_i18n::t;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_single"),
        t!("main_menu.opt_batch"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_single_preview(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            run_batch_preview(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(2) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(3) | None => Ok(false),
        _ => unreachable!(),
    }
}

type Show = fn(&PreviewSettings) -> String;
type Apply = fn(&mut PreviewSettings, &str) -> Result<()>;

/// Editable preview settings: locale key, current value, parser.
fn preview_fields() -> [(&'static str, Show, Apply); 8] {
    [
        (
            "settings.cut_length",
            |s| s.cut_length.to_string(),
            |s, v| parse_into(&mut s.cut_length, v),
        ),
        (
            "settings.max_cuts",
            |s| s.max_cuts.to_string(),
            |s, v| parse_into(&mut s.max_cuts, v),
        ),
        (
            "settings.fps",
            |s| s.fps.to_string(),
            |s, v| parse_into(&mut s.fps, v),
        ),
        (
            "settings.scale_width",
            |s| s.scale_width.to_string(),
            |s, v| parse_into(&mut s.scale_width, v),
        ),
        (
            "settings.scale_height",
            |s| s.scale_height.to_string(),
            |s, v| parse_into(&mut s.scale_height, v),
        ),
        (
            "settings.clip_frame_delay",
            |s| s.clip_frame_delay.to_string(),
            |s, v| parse_into(&mut s.clip_frame_delay, v),
        ),
        (
            "settings.combine_frame_delay",
            |s| s.combine_frame_delay.to_string(),
            |s, v| parse_into(&mut s.combine_frame_delay, v),
        ),
        (
            "settings.workers",
            |s| s.workers.to_string(),
            |s, v| parse_into(&mut s.workers, v),
        ),
    ]
}

fn parse_into<T>(slot: &mut T, raw: &str) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    *slot = raw.trim().parse()?;
    Ok(())
}

fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;
        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let fields = preview_fields();
        let mut items: Vec<String> = fields
            .iter()
            .map(|(key, show, _)| format!("{}: {}", t!(*key), show(&config.settings.preview)))
            .collect();
        items.push(format!(
            "{}: {}",
            t!("settings.language"),
            config.settings.language
        ));
        items.push(t!("settings.back").to_string());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&items)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(index) if index < fields.len() => edit_preview_field(config, fields[index])?,
            Some(index) if index == fields.len() => show_language_menu(term, config)?,
            _ => break,
        }
    }

    Ok(())
}

fn edit_preview_field(config: &mut Config, field: (&str, Show, Apply)) -> Result<()> {
    let (key, show, apply) = field;
    let raw: String = prompt_value(&t!(key), show(&config.settings.preview))?;

    let mut updated = config.settings.preview.clone();
    match apply(&mut updated, &raw).and_then(|()| updated.validate()) {
        Ok(()) if updated != config.settings.preview => {
            config.settings.preview = updated;
            save_settings(&config.settings)?;
            println!("\n{}", style(t!("common.saved")).green());
            std::thread::sleep(std::time::Duration::from_secs(1));
        }
        Ok(()) => {}
        Err(e) => {
            println!("\n{} {e:#}", style(t!("common.rejected")).red().bold());
            std::thread::sleep(std::time::Duration::from_secs(2));
        }
    }
    Ok(())
}

fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    let items: Vec<String> = Language::ALL.iter().map(ToString::to_string).collect();
    let default_index = Language::ALL
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language_prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected = Language::ALL[selection];
    if selected != config.settings.language {
        config.settings.language = selected;
        rust_i18n::set_locale(selected.as_str());
        save_settings(&config.settings)?;
        println!("\n{} {selected}", style(t!("common.saved")).green());
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

fn prompt_value<T>(label: &str, current: T) -> Result<T>
where
    T: Clone + Display + FromStr,
    T::Err: Display,
{
    Ok(Input::with_theme(&ColorfulTheme::default())
        .with_prompt(label)
        .default(current)
        .interact_text()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_into_updates_field() {
        let mut settings = PreviewSettings::default();
        parse_into(&mut settings.max_cuts, " 4 ").unwrap();
        parse_into(&mut settings.scale_height, "-1").unwrap();
        assert_eq!(settings.max_cuts, 4);
        assert_eq!(settings.scale_height, -1);
    }

    #[test]
    fn test_preview_fields_round_trip_through_editor() {
        let mut settings = PreviewSettings::default();
        for (key, show, apply) in preview_fields() {
            let current = show(&settings);
            apply(&mut settings, &current).unwrap_or_else(|e| panic!("{key}: {e}"));
        }
        assert_eq!(settings, PreviewSettings::default());

        let (_, show, apply) = preview_fields()[7];
        apply(&mut settings, "4").unwrap();
        assert_eq!(show(&settings), "4");
        assert_eq!(settings.workers, 4);
    }

    #[test]
    fn test_parse_into_rejects_garbage() {
        let mut settings = PreviewSettings::default();
        assert!(parse_into(&mut settings.cut_length, "five").is_err());
        assert!(parse_into(&mut settings.workers, "-2").is_err());
        assert_eq!(settings, PreviewSettings::default());
    }
}
