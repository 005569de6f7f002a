use std::path::Path;

use crate::jobs::Job;

/// Render the batch script wrapping one job invocation.
///
/// The job name is `{planner-tag}_{domain}_{instance}`; stdout and stderr
/// land next to the other scripts inside `script_dir`. Core count is fixed
/// at one; memory and time limits are passed through verbatim.
pub fn render_batch_script(
    job: &Job,
    invocation: &str,
    timelimit: &str,
    memorylimit: &str,
    script_dir: &Path,
) -> String {
    let taskname = format!(
        "{}_{}_{}",
        job.planner_tag, job.task.domainname, job.task.instanceno
    );
    let dir = script_dir.display();
    format!(
        "#!/bin/bash\n\
         #SBATCH --job-name={taskname}\n\
         #SBATCH -e {dir}/{taskname}.error\n\
         #SBATCH -o {dir}/{taskname}.output\n\
         #SBATCH --cpus-per-task=1\n\
         #SBATCH --mem={memorylimit}\n\
         #SBATCH --time={timelimit}\n\
         \n\
         {invocation}\n"
    )
}
