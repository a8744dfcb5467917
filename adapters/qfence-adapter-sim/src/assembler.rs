//! Text assembler.

use tracing::debug;

use qfence_hal::{Executable, ExecutableBuilder, HalError, HalResult, NativeProgram};

/// Assembles a native program into its textual form.
#[derive(Debug, Clone, Default)]
pub struct TextAssembler;

impl TextAssembler {
    pub fn new() -> Self {
        Self
    }
}

impl ExecutableBuilder for TextAssembler {
    fn assemble(&self, program: NativeProgram) -> HalResult<Executable> {
        if program.ro_size == 0 {
            return Err(HalError::Assembly(format!(
                "program {} declares no output bits",
                program.name
            )));
        }
        let text = program.to_string();
        debug!(program = %program.name, lines = text.lines().count(), "assembled program");
        Ok(Executable::new(program, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfence_ir::{ClbitId, Instruction, QubitId};
    use qfence_isa::parse_calibrations;

    #[test]
    fn test_text_includes_overrides() {
        let fragment = parse_calibrations("DEFCAL CZ 0 1:\n    FENCE 0 1\n").unwrap();
        let mut program = NativeProgram::new("p").with_fragment(&fragment);
        program.ro_size = 1;
        program
            .instructions
            .push(Instruction::measure(QubitId(0), ClbitId(0)));

        let exe = TextAssembler::new().assemble(program).unwrap();
        assert!(exe.text().starts_with("DECLARE ro BIT[1]"));
        assert!(exe.text().contains("FENCE 0 1"));
        assert!(exe.text().contains("MEASURE 0 ro[0]"));
    }

    #[test]
    fn test_program_without_output_is_rejected() {
        let err = TextAssembler::new()
            .assemble(NativeProgram::new("p"))
            .unwrap_err();
        assert!(matches!(err, HalError::Assembly(_)));
    }
}
