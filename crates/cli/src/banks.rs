use crate::Context;

#[derive(Debug, Clone, PartialEq, clap::Args)]
pub struct BanksCommand {
    /// Print the list as JSON
    #[arg(long)]
    pub json: bool,
}

impl BanksCommand {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let client = ctx.client()?;
        let mut banks = client.get_bank_list().await?;
        banks.sort_by_key(|b| b.display_order);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&banks)?);
            return Ok(());
        }
        for bank in &banks {
            println!("{:<12} {}", bank.bank_code, bank.bank_name);
        }
        Ok(())
    }
}
