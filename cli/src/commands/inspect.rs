use anyhow::Result;
use districtor::Region;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::InspectArgs) -> Result<()> {
    let region = Region::read_from_dir(&args.region)?;
    let boundary = region.watersheds().iter().filter(|ws| ws.is_boundary()).count();

    println!("region            {}", region.name());
    println!("watersheds        {} ({} on the boundary)", region.watersheds().len(), boundary);
    println!("tree depth        {}", region.depth());
    println!("blocks            {}", region.blocks().len());
    println!("adjacency links   {}", region.edge_count());
    println!("total population  {}", region.total_population());
    println!("district size     {}", region.district_size());

    Ok(())
}
