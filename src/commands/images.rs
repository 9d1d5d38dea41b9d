use crate::cli::ImageCommand;
use crate::commands::at_position;
use crate::commands::special_commands::CommandError;
use crate::error::Result;
use crate::gallery::ImageGallery;
use crate::storage::GeneratedImage;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle image commands against a loaded gallery
pub fn handle_image(command: ImageCommand, gallery: &mut ImageGallery) -> Result<()> {
    match command {
        ImageCommand::Generate { prompt } => match gallery.generate(&prompt) {
            Some(image) => print_generated(&image),
            None => println!("{}", "Nothing to generate: the prompt is empty.".yellow()),
        },
        ImageCommand::List => {
            if gallery.images().is_empty() {
                println!("{}", "No generated images found.".yellow());
                return Ok(());
            }

            println!("\nGenerated Images:");
            image_table(gallery.images()).printstd();
            println!();
        }
        ImageCommand::Show { index } => {
            let image = at_position(gallery.images(), index, "image")?;
            print_image(image);
        }
        ImageCommand::Delete { index } => {
            let removed = index
                .checked_sub(1)
                .and_then(|i| gallery.delete_image(i))
                .ok_or(CommandError::OutOfRange {
                    what: "image",
                    position: index,
                })?;
            println!(
                "{}",
                format!("Removed image for \"{}\"", removed.prompt).green()
            );
        }
    }

    Ok(())
}

/// Table of images with 1-based positions, newest first
pub fn image_table(images: &[GeneratedImage]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.set_titles(prettytable::row!["#".bold(), "Prompt".bold(), "URL".bold()]);

    for (i, image) in images.iter().enumerate() {
        table.add_row(prettytable::row![
            (i + 1).to_string().cyan(),
            image.prompt,
            image.image_url
        ]);
    }

    table
}

/// Print a freshly generated image
pub fn print_generated(image: &GeneratedImage) {
    println!("{}", "Image ready:".green());
    println!("{}", image.image_url.cyan());
}

/// Print an image's prompt and full-size URL
pub fn print_image(image: &GeneratedImage) {
    println!("\n{}", "Prompt:".bold());
    println!("{}\n", image.prompt);
    println!("{}", "Full size:".bold());
    println!("{}\n", image.image_url.cyan());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ImageEndpoint, DEFAULT_IMAGE_ENDPOINT};
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn gallery() -> ImageGallery {
        let endpoint = ImageEndpoint::new(DEFAULT_IMAGE_ENDPOINT).unwrap();
        ImageGallery::load(Arc::new(MemoryStore::new()), endpoint)
    }

    #[test]
    fn test_generate_adds_to_gallery() {
        let mut gallery = gallery();

        handle_image(
            ImageCommand::Generate {
                prompt: "a cat".to_string(),
            },
            &mut gallery,
        )
        .unwrap();

        assert_eq!(gallery.images().len(), 1);
        assert!(gallery.images()[0].image_url.ends_with("/a%20cat"));
    }

    #[test]
    fn test_generate_blank_prompt_is_not_an_error() {
        let mut gallery = gallery();
        handle_image(
            ImageCommand::Generate {
                prompt: "   ".to_string(),
            },
            &mut gallery,
        )
        .unwrap();
        assert!(gallery.images().is_empty());
    }

    #[test]
    fn test_delete_by_position() {
        let mut gallery = gallery();
        gallery.generate("older");
        gallery.generate("newer");

        handle_image(ImageCommand::Delete { index: 1 }, &mut gallery).unwrap();

        assert_eq!(gallery.images().len(), 1);
        assert_eq!(gallery.images()[0].prompt, "older");
    }

    #[test]
    fn test_delete_out_of_range() {
        let mut gallery = gallery();
        gallery.generate("only");

        assert!(handle_image(ImageCommand::Delete { index: 0 }, &mut gallery).is_err());
        assert!(handle_image(ImageCommand::Delete { index: 2 }, &mut gallery).is_err());
        assert_eq!(gallery.images().len(), 1);
    }

    #[test]
    fn test_list_and_show() {
        let mut gallery = gallery();
        handle_image(ImageCommand::List, &mut gallery).unwrap();

        gallery.generate("a dog");
        handle_image(ImageCommand::List, &mut gallery).unwrap();
        handle_image(ImageCommand::Show { index: 1 }, &mut gallery).unwrap();
        assert!(handle_image(ImageCommand::Show { index: 2 }, &mut gallery).is_err());
        assert_eq!(image_table(gallery.images()).len(), 1);
    }
}
