use std::io::{self, BufRead, Write};

use anyhow::Result;
use log::*;

use crate::catalog::DEFAULT_QUANTITY;
use crate::errors::Error;
use crate::menu::{Menu, SharedIngredient};
use crate::repository::Repository;
use crate::services::Barista;

/// What a line of input resolves to. Resolution is two-step: a current menu
/// reference wins, anything else falls back to the fixed command table.
#[derive(Debug)]
enum Command {
    Dispense(String),
    RestockAll,
    Quit,
    Invalid(String),
}

impl Command {
    fn for_input(menu: &Menu, input: &str) -> Command {
        if menu.has_reference(input) {
            return Command::Dispense(input.to_string());
        }
        match input {
            "r" => Command::RestockAll,
            "q" => Command::Quit,
            _ => Command::Invalid(input.to_string()),
        }
    }
}

pub fn write_inventory<Out: Write>(
    output: &mut Out,
    inventory: &[SharedIngredient],
) -> io::Result<()> {
    writeln!(output, "Inventory:")?;
    for ingredient in inventory {
        writeln!(
            output,
            "{},{}",
            ingredient.name(),
            ingredient.available_quantity()
        )?;
    }
    Ok(())
}

pub fn write_menu<Out: Write>(output: &mut Out, menu: &Menu) -> io::Result<()> {
    writeln!(output, "Menu:")?;
    for (reference, drink) in menu.iter() {
        writeln!(
            output,
            "{},{},${:.2},{}",
            reference,
            drink.name(),
            drink.cost(),
            drink.can_be_dispensed()
        )?;
    }
    Ok(())
}

/// The interactive terminal loop. Each round prints the inventory and menu,
/// reads a selection, and dispatches it. Generic over the reader and writer
/// so tests can script whole sessions.
pub struct InteractiveCli<R, In, Out> {
    barista: Barista<R>,
    input: In,
    output: Out,
}

impl<R, In, Out> InteractiveCli<R, In, Out>
where
    R: Repository,
    In: BufRead,
    Out: Write,
{
    pub fn new(barista: Barista<R>, input: In, output: Out) -> Self {
        InteractiveCli {
            barista,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            let inventory = self.barista.get_inventory()?;
            write_inventory(&mut self.output, &inventory)?;
            let menu = self.barista.get_menu()?;
            write_menu(&mut self.output, &menu)?;

            let input = match self.next_input()? {
                Some(input) => input,
                // End of input reads as quitting.
                None => break,
            };
            let command = Command::for_input(&menu, &input);
            debug!("Input {:?} -> {:?}", input, command);
            match command {
                Command::Quit => break,
                Command::RestockAll => {
                    self.barista.restock_all(DEFAULT_QUANTITY)?;
                    writeln!(self.output, "Inventory re-stocked")?;
                }
                Command::Dispense(reference) => self.dispense(&reference)?,
                Command::Invalid(input) => {
                    writeln!(self.output, "Invalid selection: {}", input)?
                }
            }
        }
        Ok(())
    }

    /// Reads the next non-blank line, trimmed and lower-cased; `None` on end
    /// of input.
    fn next_input(&mut self) -> Result<Option<String>> {
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let input = line.trim().to_lowercase();
            if !input.is_empty() {
                return Ok(Some(input));
            }
        }
    }

    fn dispense(&mut self, reference: &str) -> Result<()> {
        match self.barista.dispense_by_reference(reference) {
            Ok(drink) => writeln!(self.output, "Dispensing: {}", drink)?,
            Err(err) => match err.downcast::<Error>()? {
                Error::OutOfStock(drink) => writeln!(self.output, "Out of stock: {}", drink)?,
                Error::InvalidSelectedDrink(selection) => {
                    writeln!(self.output, "Invalid selection: {}", selection)?
                }
            },
        }
        Ok(())
    }
}
